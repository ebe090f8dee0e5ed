use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let is_tty = std::io::stdout().is_terminal();
    let no_color = std::env::var_os("NO_COLOR").is_some();
    let term_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    let _ = UI_PREFS.set(resolve(flags, is_tty, no_color, term_width));
}

fn resolve(
    flags: &GlobalFlags,
    is_tty: bool,
    no_color: bool,
    term_width: Option<usize>,
) -> UiPrefs {
    let table = flags.format == OutputFormat::Table;
    let table_color = match flags.color {
        ColorMode::Always => table,
        ColorMode::Never => false,
        ColorMode::Auto => is_tty && table && !flags.quiet && !no_color,
    };

    UiPrefs {
        table_color,
        progress: is_tty && !flags.quiet && flags.format != OutputFormat::Json,
        term_width,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        table_color: false,
        progress: false,
        term_width: None,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::resolve;
    use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

    fn flags(format: OutputFormat, color: ColorMode) -> GlobalFlags {
        GlobalFlags {
            format,
            limit: None,
            quiet: false,
            verbose: false,
            backend: None,
            timeout_ms: None,
            color,
        }
    }

    #[rstest]
    #[case(ColorMode::Auto, true, false, true)]
    #[case(ColorMode::Auto, false, false, false)]
    #[case(ColorMode::Auto, true, true, false)]
    #[case(ColorMode::Always, false, true, true)]
    #[case(ColorMode::Never, true, false, false)]
    fn table_color_follows_mode(
        #[case] mode: ColorMode,
        #[case] is_tty: bool,
        #[case] no_color: bool,
        #[case] expected: bool,
    ) {
        let prefs = resolve(&flags(OutputFormat::Table, mode), is_tty, no_color, None);
        assert_eq!(prefs.table_color, expected);
    }

    #[test]
    fn json_output_never_colors_or_spins() {
        let prefs = resolve(&flags(OutputFormat::Json, ColorMode::Always), true, false, None);
        assert!(!prefs.table_color);
        assert!(!prefs.progress);
    }

    #[test]
    fn quiet_disables_progress() {
        let mut quiet = flags(OutputFormat::Table, ColorMode::Auto);
        quiet.quiet = true;
        assert!(!resolve(&quiet, true, false, None).progress);
    }
}
