use std::path::Path;

/// Subcommands reachable through a renamed or symlinked binary.
pub(super) const PROGRAM_ALIASES: [(&str, &str); 5] = [
    ("extract-point", "extract-point"),
    ("plot", "plot"),
    ("plot-multipole", "plot-multipole"),
    ("save-multipole", "save-multipole"),
    ("plot-timeseries", "plot-timeseries"),
];

/// Maps an executable name such as `extract_point.py` or `plot-multipole`
/// onto its subcommand. The `nrpost` binary itself has no alias.
pub(super) fn command_alias_from_program_name(program_name: &str) -> Option<&'static str> {
    let executable_name = Path::new(program_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program_name);
    let stem = [".exe", ".py"]
        .iter()
        .find_map(|suffix| executable_name.strip_suffix(suffix))
        .unwrap_or(executable_name);
    let normalized = stem.replace('_', "-");
    let normalized = match normalized.as_str() {
        "plot-timesires" => "plot-timeseries",
        other => other,
    };

    PROGRAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, command)| *command)
}

#[cfg(test)]
mod tests {
    use super::command_alias_from_program_name;

    #[test]
    fn script_names_map_to_subcommands() {
        assert_eq!(
            command_alias_from_program_name("/usr/local/bin/extract_point.py"),
            Some("extract-point")
        );
        assert_eq!(command_alias_from_program_name("plot.py"), Some("plot"));
        assert_eq!(
            command_alias_from_program_name("plot_timesires.py"),
            Some("plot-timeseries")
        );
        assert_eq!(
            command_alias_from_program_name("save-multipole.exe"),
            Some("save-multipole")
        );
    }

    #[test]
    fn main_binary_has_no_alias() {
        assert_eq!(command_alias_from_program_name("target/debug/nrpost"), None);
        assert_eq!(command_alias_from_program_name("unrelated"), None);
    }
}
