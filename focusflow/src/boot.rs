//! The retro boot screen shown before the main view.

pub const BANNER: &str = r"
 ███████╗ ██████╗  ██████╗██╗   ██╗███████╗
 ██╔════╝██╔═══██╗██╔════╝██║   ██║██╔════╝
 █████╗  ██║   ██║██║     ██║   ██║███████╗
 ██╔══╝  ██║   ██║██║     ██║   ██║╚════██║
 ██║     ╚██████╔╝╚██████╗╚██████╔╝███████║
 ╚═╝      ╚═════╝  ╚═════╝ ╚═════╝ ╚══════╝
    .... FOCUSFLOW SYSTEM v1.9.8.4 ....";

pub const BOOT_LINES: [&str; 10] = [
    "INITIALIZING FFS-1984...",
    "VIRTUAL BIOS v2.3.1",
    "CPU: SYNTHWAVE-8086 @ 4.77MHz",
    "MEMORY: 640KB OK",
    "LOADING VIBE OS...",
    "DECOMPRESSING LOFI.SYS... OK",
    "CONNECTING TO ETHER-REALM... CONNECTED.",
    "SYNCING... AUDIO_STREAMS... READY.",
    "USER_INTERFACE... READY.",
    "SYSTEM BOOT COMPLETE.",
];

const PROGRESS_STEP: u8 = 20;
const BAR_CELLS: usize = 25;

#[derive(Debug, Clone, Default)]
pub struct BootSequence {
    shown: usize,
    progress: u8,
}

impl BootSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// One animation step: reveal a line, then fill the progress bar.
    pub fn step(&mut self) {
        if self.shown < BOOT_LINES.len() {
            self.shown += 1;
        } else if self.progress < 100 {
            self.progress = (self.progress + PROGRESS_STEP).min(100);
        }
    }

    pub fn lines(&self) -> &[&'static str] {
        &BOOT_LINES[..self.shown]
    }

    pub fn is_finalizing(&self) -> bool {
        self.shown == BOOT_LINES.len()
    }

    pub fn is_complete(&self) -> bool {
        self.is_finalizing() && self.progress >= 100
    }

    pub fn progress_bar(&self, filled: &str, empty: &str) -> String {
        let cells = usize::from(self.progress) * BAR_CELLS / 100;
        format!(
            "[{}{}] {}%",
            filled.repeat(cells),
            empty.repeat(BAR_CELLS - cells),
            self.progress
        )
    }
}
