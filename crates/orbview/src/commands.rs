//! Line-oriented control protocol read from stdin while the window is open.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail, Result};
use orb_renderer::ParameterHandle;
use winit::event_loop::EventLoopProxy;

#[derive(Debug, Clone, PartialEq)]
pub enum OrbCommand {
    Hue(f32),
    HoverIntensity(f32),
    Background(String),
    ForceHover(bool),
    RotateOnHover(bool),
    Quit,
}

impl OrbCommand {
    /// Parses one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let command = match verb {
            "hue" => OrbCommand::Hue(parse_float(verb, rest)?),
            "hover-intensity" => OrbCommand::HoverIntensity(parse_float(verb, rest)?),
            "background" => {
                if rest.is_empty() {
                    bail!("`background` needs a color");
                }
                OrbCommand::Background(rest.to_string())
            }
            "force-hover" => OrbCommand::ForceHover(parse_switch(verb, rest)?),
            "rotate-on-hover" => OrbCommand::RotateOnHover(parse_switch(verb, rest)?),
            "quit" | "exit" => OrbCommand::Quit,
            other => bail!("unknown command `{other}`"),
        };
        Ok(Some(command))
    }

    /// Writes a parameter command through `handle`. Returns `false` for
    /// [`OrbCommand::Quit`], which the caller handles.
    pub fn apply(&self, handle: &ParameterHandle) -> bool {
        match self {
            OrbCommand::Hue(hue) => handle.set_hue(*hue),
            OrbCommand::HoverIntensity(intensity) => handle.set_hover_intensity(*intensity),
            OrbCommand::Background(color) => handle.set_background_color(color.as_str()),
            OrbCommand::ForceHover(on) => handle.set_force_hover_state(*on),
            OrbCommand::RotateOnHover(on) => handle.set_rotate_on_hover(*on),
            OrbCommand::Quit => return false,
        }
        true
    }
}

fn parse_float(verb: &str, value: &str) -> Result<f32> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| anyhow!("`{verb}` expects a number, got `{value}`"))?;
    if !parsed.is_finite() {
        bail!("`{verb}` expects a finite number");
    }
    Ok(parsed)
}

fn parse_switch(verb: &str, value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => bail!("`{verb}` expects on|off, got `{other}`"),
    }
}

/// Reads commands from stdin on a background thread and forwards them to the
/// event loop. The thread ends at EOF or once the event loop is gone.
pub fn spawn_stdin_reader(proxy: EventLoopProxy<OrbCommand>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("orbview-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read stdin; stopping command reader");
                        return;
                    }
                };
                match OrbCommand::parse(&line) {
                    Ok(Some(command)) => {
                        if proxy.send_event(command).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "ignoring command"),
                }
            }
            tracing::debug!("stdin closed; command reader finished");
        })
        .map_err(|err| anyhow!("failed to spawn stdin reader: {err}"))
}
