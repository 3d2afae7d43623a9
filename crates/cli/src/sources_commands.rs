use std::path::PathBuf;

use {
    serde_json::json,
    skillcue_config::SkillcueConfig,
    skillcue_skills::{ContentLocator, FsContentLocator},
};

pub async fn handle_sources(
    config: &SkillcueConfig,
    project_flag: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let home = skillcue_config::home_dir();
    let project = crate::project_dir(project_flag, None);
    let roots = match config.content_roots(home.as_deref()) {
        roots if roots.is_empty() => FsContentLocator::default_roots(&project, home.as_deref()),
        roots => roots,
    };

    let locator = FsContentLocator::new(roots.clone())
        .with_marker_file(config.content.marker_file.clone())
        .with_active_marker(&config.content.active_marker)
        .with_max_depth(config.content.max_depth);
    let sources = locator.locate().await;

    if json {
        let out = json!({
            "roots": roots
                .iter()
                .map(|r| json!({ "path": r, "exists": r.is_dir() }))
                .collect::<Vec<_>>(),
            "skills": sources
                .sorted()
                .iter()
                .map(|s| json!({ "name": s.name, "path": s.path, "active": s.active }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Content roots:");
    for root in &roots {
        let icon = if root.is_dir() { "✓" } else { "✗" };
        println!("  {icon} {}", root.display());
    }
    if !config.content.enabled {
        println!("(content injection disabled, skills are listed by name only)");
    }

    if sources.is_empty() {
        println!("No skill content found.");
        return Ok(());
    }
    println!("Skills ({}):", sources.len());
    for source in sources.sorted() {
        let marker = if source.active { " (active)" } else { "" };
        println!("  {} — {}{marker}", source.name, source.path.display());
    }
    Ok(())
}
