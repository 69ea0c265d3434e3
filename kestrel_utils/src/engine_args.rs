use argh::FromArgs;
use std::sync::LazyLock;

fn present_mode(mode: &str) -> Result<Option<wgpu::PresentMode>, String> {
    let parsed = match mode {
        "vsync" => wgpu::PresentMode::AutoVsync,
        "no_vsync" => wgpu::PresentMode::AutoNoVsync,
        "fifo" => wgpu::PresentMode::Fifo,
        "fifo_relaxed" => wgpu::PresentMode::FifoRelaxed,
        "mailbox" => wgpu::PresentMode::Mailbox,
        "immediate" => wgpu::PresentMode::Immediate,
        _ => return Ok(None),
    };
    Ok(Some(parsed))
}

fn window_size(size: &str) -> Result<Option<(u32, u32)>, String> {
    let sep = if size.contains('x') { 'x' } else { ',' };

    let mut split = size.split(sep);
    let w: Option<u32> = split.next().and_then(|w| w.parse().ok());
    let h: Option<u32> = split.next().and_then(|h| h.parse().ok());

    let size = match (w, h) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), _) => (w, w),
        _ => return Ok(None),
    };

    Ok(Some(size))
}

/// Engine arguments
#[derive(Default, FromArgs)]
pub struct EngineArgs {
    #[argh(switch, hidden_help)]
    pub fullscreen: bool,

    #[argh(option, hidden_help)]
    pub max_frames_in_flight: Option<u32>,

    #[argh(option, hidden_help, from_str_fn(present_mode))]
    pub present_mode: Option<Option<wgpu::PresentMode>>,
    #[argh(option, hidden_help, from_str_fn(window_size))]
    pub window_size: Option<Option<(u32, u32)>>,
}

impl EngineArgs {
    fn init() -> Option<EngineArgs> {
        let mut args = std::env::args();
        let cmd_name = args.next()?;
        let args: Vec<String> = args.collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        EngineArgs::from_args(&[&cmd_name], &args).ok()
    }

    pub fn get() -> &'static EngineArgs {
        static INSTANCE: LazyLock<EngineArgs> =
            LazyLock::new(|| EngineArgs::init().unwrap_or_default());
        &INSTANCE
    }

    /// Window dimensions requested on the command line, if any.
    pub fn requested_window_size() -> Option<(u32, u32)> {
        EngineArgs::get().window_size.flatten()
    }

    pub fn requested_present_mode() -> Option<wgpu::PresentMode> {
        EngineArgs::get().present_mode.flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_accepts_both_separators() {
        assert_eq!(window_size("1600x900"), Ok(Some((1600, 900))));
        assert_eq!(window_size("800,600"), Ok(Some((800, 600))));
        assert_eq!(window_size("512"), Ok(Some((512, 512))));
        assert_eq!(window_size("abc"), Ok(None));
    }

    #[test]
    fn present_mode_parses_known_names() {
        assert_eq!(present_mode("vsync"), Ok(Some(wgpu::PresentMode::AutoVsync)));
        assert_eq!(present_mode("mailbox"), Ok(Some(wgpu::PresentMode::Mailbox)));
        assert_eq!(present_mode("unknown"), Ok(None));
    }
}
