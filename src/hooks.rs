//! Scenario lifecycle hooks.

use tracing::info;

/// Console banner naming a scenario before it runs.
///
/// ```text
///
/// ---------------------------------
/// | Starting scenario "Get flows" |
/// ---------------------------------
/// ```
pub fn scenario_banner(name: &str) -> String {
    let header = format!("| Starting scenario \"{}\" |", name);
    let rule = "-".repeat(header.chars().count());
    format!("\n{}\n{}\n{}", rule, header, rule)
}

/// Print the banner and log the scenario start.
pub fn announce_scenario(name: &str) {
    println!("{}", scenario_banner(name));
    info!(scenario = name, "starting scenario");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_layout() {
        let banner = scenario_banner("Get flows");
        let lines: Vec<&str> = banner.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "");
        assert_eq!(lines[2], "| Starting scenario \"Get flows\" |");
        assert_eq!(lines[1], lines[3]);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_banner_counts_chars() {
        let banner = scenario_banner("pagamento è riuscito");
        let lines: Vec<&str> = banner.split('\n').collect();
        assert_eq!(lines[1].chars().count(), lines[2].chars().count());
    }
}
