use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use shotbot_common::{ChartKind, EntityMatch};

use crate::traits::ChartGenerator;

/// Exit code the renderer uses to say the player has no shot data.
pub const NO_DATA_EXIT_CODE: i32 = 3;

const FILE_EXTENSION: &str = "png";

/// Renders charts by running an external renderer executable:
///
/// `<renderer> <entity id> <canonical name> <kind> <output path>`
///
/// The chart title is passed in `SHOTBOT_CHART_TITLE`. The process is killed
/// if the caller stops waiting (e.g. on timeout).
pub struct CommandChartGenerator {
    renderer_bin: String,
    save_path: PathBuf,
}

impl CommandChartGenerator {
    pub fn new(renderer_bin: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            renderer_bin: renderer_bin.into(),
            save_path: save_path.into(),
        }
    }

    pub fn output_path(&self, entity: &EntityMatch, kind: ChartKind, date: NaiveDate) -> PathBuf {
        self.save_path.join(chart_file_name(&entity.canonical_name, kind, date))
    }
}

/// "[2016-02-15]-stephen-curry-scatter.png" for ("Curry, Stephen", Scatter).
pub fn chart_file_name(canonical_name: &str, kind: ChartKind, date: NaiveDate) -> String {
    let name_part = canonical_name
        .to_lowercase()
        .split(',')
        .rev()
        .map(|part| part.split_whitespace().collect::<Vec<_>>().join("-"))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!(
        "[{}]-{}-{}.{}",
        date.format("%Y-%m-%d"),
        name_part,
        kind,
        FILE_EXTENSION
    )
}

/// "[2016-02-15] Curry, Stephen - scatter".
pub fn chart_title(canonical_name: &str, kind: ChartKind, date: NaiveDate) -> String {
    format!("[{}] {} - {}", date.format("%Y-%m-%d"), canonical_name, kind)
}

#[async_trait]
impl ChartGenerator for CommandChartGenerator {
    async fn generate(&self, entity: &EntityMatch, kind: ChartKind) -> Result<Option<PathBuf>> {
        let today = Local::now().date_naive();
        tokio::fs::create_dir_all(&self.save_path)
            .await
            .with_context(|| format!("Failed to create {}", self.save_path.display()))?;

        let output_path = self.output_path(entity, kind, today);
        info!(
            entity_id = %entity.entity_id,
            name = entity.canonical_name.as_str(),
            %kind,
            path = %output_path.display(),
            "Rendering chart"
        );

        let output = tokio::process::Command::new(&self.renderer_bin)
            .arg(entity.entity_id.to_string())
            .arg(&entity.canonical_name)
            .arg(kind.as_str())
            .arg(&output_path)
            .env(
                "SHOTBOT_CHART_TITLE",
                chart_title(&entity.canonical_name, kind, today),
            )
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run renderer {}", self.renderer_bin))?;

        let written = output.status.success() && exists(&output_path).await;
        match output.status.code() {
            Some(0) if written => Ok(Some(output_path)),
            Some(0) => {
                warn!(path = %output_path.display(), "Renderer succeeded but wrote no file");
                Ok(None)
            }
            Some(NO_DATA_EXIT_CODE) => {
                info!(entity_id = %entity.entity_id, "No shot data");
                Ok(None)
            }
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                anyhow::bail!(
                    "Renderer exited with {} for {}: {}",
                    output.status,
                    entity.canonical_name,
                    stderr.trim()
                )
            }
        }
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 2, 15).unwrap()
    }

    #[test]
    fn file_name_uses_reading_order() {
        assert_eq!(
            chart_file_name("Curry, Stephen", ChartKind::Scatter, day()),
            "[2016-02-15]-stephen-curry-scatter.png"
        );
        assert_eq!(
            chart_file_name("Jones Jr., Derrick", ChartKind::Hex, day()),
            "[2016-02-15]-derrick-jones-jr.-hex.png"
        );
        assert_eq!(
            chart_file_name("Nene", ChartKind::Kde, day()),
            "[2016-02-15]-nene-kde.png"
        );
    }

    #[test]
    fn title_includes_date_name_and_kind() {
        assert_eq!(
            chart_title("Curry, Stephen", ChartKind::Hex, day()),
            "[2016-02-15] Curry, Stephen - hex"
        );
    }

    #[cfg(unix)]
    mod renderer {
        use super::*;
        use shotbot_common::EntityId;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.display().to_string()
        }

        fn curry() -> EntityMatch {
            EntityMatch::new(EntityId(201939), "Curry, Stephen")
        }

        // One test so no other thread forks while a script is still open for writing.
        #[tokio::test]
        async fn maps_renderer_exit_codes() {
            let dir = tempfile::tempdir().unwrap();
            let charts = dir.path().join("charts");

            let ok = script(dir.path(), "ok.sh", r#"echo "$SHOTBOT_CHART_TITLE" > "$4""#);
            let path = CommandChartGenerator::new(ok, &charts)
                .generate(&curry(), ChartKind::Scatter)
                .await
                .unwrap()
                .unwrap();
            let written = std::fs::read_to_string(&path).unwrap();
            assert!(written.contains("Curry, Stephen - scatter"));
            assert!(path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("-stephen-curry-scatter.png"));

            let no_data = script(dir.path(), "nodata.sh", "exit 3");
            let result = CommandChartGenerator::new(no_data, &charts)
                .generate(&curry(), ChartKind::Hex)
                .await
                .unwrap();
            assert!(result.is_none());

            let silent = script(dir.path(), "silent.sh", "exit 0");
            let result = CommandChartGenerator::new(silent, &charts)
                .generate(&curry(), ChartKind::Kde)
                .await
                .unwrap();
            assert!(result.is_none());

            let broken = script(dir.path(), "broken.sh", "echo boom >&2; exit 1");
            let err = CommandChartGenerator::new(broken, &charts)
                .generate(&curry(), ChartKind::Hex)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("boom"), "{err}");
        }
    }
}
