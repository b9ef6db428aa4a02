//! Persistence of the augmented task list.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::Domain;
use crate::error::PersistError;
use crate::task::Task;

/// File name of the augmented task list inside a domain directory.
pub const OUTPUT_FILE: &str = "tasks_singleturn.json";

/// `<data_root>/<domain>/tasks_singleturn.json`
pub fn output_path(data_root: &Path, domain: Domain) -> PathBuf {
    data_root.join(domain.as_str()).join(OUTPUT_FILE)
}

/// Write the whole task list as one pretty-printed JSON document.
///
/// Any existing file is replaced. The document is written to a temporary
/// file next to the destination and renamed over it.
pub fn save_tasks(tasks: &[Task], domain: Domain, data_root: &Path) -> Result<PathBuf, PersistError> {
    let path = output_path(data_root, domain);
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_root.to_path_buf());
    if !dir.is_dir() {
        return Err(PersistError::MissingDirectory(dir));
    }

    let tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, tasks)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.persist(&path).map_err(|e| PersistError::Write {
        path: path.clone(),
        source: e.error,
    })?;

    info!(path = %path.display(), tasks = tasks.len(), "Saved augmented tasks");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ActionCall;
    use serde_json::{json, Map};
    use std::fs;

    fn tasks() -> Vec<Task> {
        let mut augmented = Task::new(
            "jane_doe_123",
            "Cancel order 5591.",
            vec![ActionCall::new("cancel_order", Map::new())],
        );
        augmented.question = Some("I want to cancel order 5591.".to_string());
        augmented.action_results = Some(vec![json!({"status": "cancelled"})]);
        vec![augmented, Task::new("mia_li_3668", "Look around.", vec![])]
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/data"), Domain::Airline),
            PathBuf::from("/data/airline/tasks_singleturn.json")
        );
    }

    #[test]
    fn test_save_writes_full_list() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("retail")).unwrap();

        let path = save_tasks(&tasks(), Domain::Retail, root.path()).unwrap();
        assert_eq!(path, root.path().join("retail/tasks_singleturn.json"));

        let saved: Vec<Task> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, tasks());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw[1].get("question").is_none());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("retail")).unwrap();
        fs::write(root.path().join("retail/tasks_singleturn.json"), "stale").unwrap();

        let path = save_tasks(&tasks()[..1], Domain::Retail, root.path()).unwrap();
        let saved: Vec<Task> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);

        let leftovers = fs::read_dir(root.path().join("retail")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_missing_domain_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = save_tasks(&tasks(), Domain::Airline, root.path()).unwrap_err();
        assert!(matches!(err, PersistError::MissingDirectory(_)));
    }
}
