use anyhow::{bail, Context, Result};
use std::{
    path::PathBuf,
    process::{Command, ExitStatus},
};
use swipetype::compose::Edit;

const KEY_BACKSPACE: &str = "14";
const KEY_ENTER: &str = "28";

pub struct TextInjector {
    socket_path: PathBuf,
}

impl TextInjector {
    pub fn new() -> Result<Self> {
        let socket_path = PathBuf::from("/tmp/.ydotool_socket");

        if !socket_path.exists() {
            Self::ensure_ydotoold_running()?;
        }

        Ok(Self { socket_path })
    }

    fn ensure_ydotoold_running() -> Result<()> {
        let status = Command::new("pgrep")
            .arg("ydotoold")
            .status()
            .context("Failed to check ydotoold")?;

        if !status.success() {
            Command::new("ydotoold").spawn().context(
                "Failed to start ydotoold. Make sure it's installed: 'sudo pacman -S ydotool'",
            )?;
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
        Ok(())
    }

    pub fn apply(&self, edit: &Edit) -> Result<()> {
        match edit {
            Edit::Insert(text) => self.inject(text),
            Edit::DeleteBackward => self.press(KEY_BACKSPACE).context("Failed to inject backspace key"),
            Edit::Submit(_) => self.press(KEY_ENTER).context("Failed to inject enter key"),
            Edit::Replace { erase, text } => {
                for _ in 0..*erase {
                    self.press(KEY_BACKSPACE).context("Failed to erase composed text")?;
                }
                self.inject(text)
            }
        }
    }

    fn press(&self, code: &str) -> Result<()> {
        let status = Command::new("ydotool")
            .env("YDOTOOL_SOCKET", &self.socket_path)
            .arg("key")
            .arg(format!("{}:1", code))
            .arg(format!("{}:0", code))
            .status()
            .context("Failed to run ydotool")?;
        check_status(status, "key")
    }

    fn inject(&self, text: &str) -> Result<()> {
        let status = Command::new("ydotool")
            .env("YDOTOOL_SOCKET", &self.socket_path)
            .args(["type", "--"])
            .arg(text)
            .status()
            .context("Failed to inject text")?;
        check_status(status, "type")
    }
}

fn check_status(status: ExitStatus, action: &str) -> Result<()> {
    if !status.success() {
        bail!("ydotool {} exited with {}", action, status);
    }
    Ok(())
}
