use anyhow::{Context, Result};
use gateway_config::{admit_lenient, default_config_path, discover_overrides, load_config_file};
use std::path::Path;

/// Load and validate the config file plus environment overrides, printing
/// every admission warning. Exits non-zero only on a hard parse failure —
/// individual bad server entries are demoted with a warning, not fatal
/// (§4.8's "one bad entry does not sink the file" policy).
pub fn execute(config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(default_config_path);

    println!("Checking configuration: {}", path.display());

    let file = load_config_file(Path::new(&path))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut warning_count = 0;
    for (id, raw) in file.mcp_servers {
        let admitted = admit_lenient(&id, raw);
        print_admission(&id, admitted.demoted, &admitted.warnings, &mut warning_count);
    }

    let overrides = discover_overrides(std::env::vars());
    for (id, raw) in overrides {
        let admitted = admit_lenient(&id, raw);
        print_admission(
            &format!("{} (env override)", id),
            admitted.demoted,
            &admitted.warnings,
            &mut warning_count,
        );
    }

    if warning_count == 0 {
        println!("OK: no admission warnings");
    } else {
        println!("{} admission warning(s)", warning_count);
    }

    Ok(())
}

fn print_admission(label: &str, demoted: bool, warnings: &[String], count: &mut usize) {
    if warnings.is_empty() {
        println!("  {}: admitted", label);
        return;
    }
    for warning in warnings {
        println!("  {}: {}", label, warning);
        *count += 1;
    }
    if demoted {
        println!("  {}: risk level demoted", label);
    }
}
