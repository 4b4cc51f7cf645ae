//! List command - prints configured profiles in declaration order

use crate::config::AppConfig;
use crate::domain::ProfileCatalog;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = config.catalog()?;

    if catalog.is_empty() {
        eprintln!("No profiles configured");
        return Ok(());
    }

    print!("{}", render(&catalog));
    Ok(())
}

/// One `id  family  endpoint` row per profile; `*` marks the default
pub fn render(catalog: &ProfileCatalog) -> String {
    let default_id = catalog.default_profile().map(|p| p.id().to_string());
    let width = catalog
        .list()
        .iter()
        .map(|p| p.id().len())
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    for profile in catalog.list() {
        let marker = if default_id.as_deref() == Some(profile.id()) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {:<width$}  {:<6}  {}\n",
            marker,
            profile.id(),
            profile.family().as_str(),
            profile.endpoint(),
            width = width
        ));
    }
    out
}
