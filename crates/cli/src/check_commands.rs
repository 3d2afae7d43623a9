use std::{path::PathBuf, process::ExitCode};

use {
    anyhow::Context,
    skillcue_config::SkillcueConfig,
    skillcue_skills::{RuleStore, Severity, ValidationReport, validate_rules},
};

pub fn handle_check(
    config: &SkillcueConfig,
    project_flag: Option<PathBuf>,
    rules: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let path = match rules {
        Some(path) => path,
        None => {
            let home = skillcue_config::home_dir();
            let project = crate::project_dir(project_flag, None);
            let candidates = match config.rule_paths(home.as_deref()) {
                paths if paths.is_empty() => {
                    RuleStore::default_candidates(&project, home.as_deref())
                },
                paths => paths,
            };
            let store = RuleStore::new(candidates);
            match store.find() {
                Some(path) => path.to_path_buf(),
                None => {
                    eprintln!("No skill rules found. Searched:");
                    for candidate in store.candidates() {
                        eprintln!("  {}", candidate.display());
                    }
                    return Ok(ExitCode::FAILURE);
                },
            }
        },
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = validate_rules(&raw, &path);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &ValidationReport) {
    println!(
        "{}: {} skill(s), {} error(s), {} warning(s)",
        report.path.display(),
        report.skills,
        report.count(Severity::Error),
        report.count(Severity::Warning),
    );
    for diagnostic in &report.diagnostics {
        let icon = match diagnostic.severity {
            Severity::Error => "✗",
            Severity::Warning => "!",
            Severity::Info => "·",
        };
        match &diagnostic.skill {
            Some(skill) => println!(
                "  {icon} {:<7} [{skill}] {}",
                diagnostic.severity, diagnostic.message
            ),
            None => println!("  {icon} {:<7} {}", diagnostic.severity, diagnostic.message),
        }
    }
}
