//! Local plan store used in place of the hosted backend.
//!
//! Plans are kept as one JSON file each under `<data_dir>/plans/`. Saving
//! assigns stored ids to slots that still carry temporary ids and reports
//! the assignments so an open session can reconcile them.

use crate::sequence::Sequence;
use crate::{Error, Plan, Result, SlotId, TempId};
use chrono::Utc;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Persistence collaborator for plans
pub trait PlanStore {
    /// Load a plan by name
    fn load(&self, name: &str) -> Result<Plan>;

    /// Save a plan, returning the stored ids given to temporary slots
    fn save(&mut self, plan: &Plan) -> Result<HashMap<TempId, String>>;

    /// Names of all stored plans, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Remove a stored plan
    fn delete(&mut self, name: &str) -> Result<()>;
}

impl Plan {
    /// Exercise list as a validated sequence
    pub fn sequence(&self) -> Result<Sequence> {
        Sequence::from_slots(self.exercises.clone())
    }

    /// Replace the exercise list with a snapshot
    pub fn set_sequence(&mut self, seq: Sequence) {
        self.exercises = seq.into_slots();
    }
}

/// JSON-file plan store with file locking
pub struct JsonFilePlanStore {
    dir: PathBuf,
}

impl JsonFilePlanStore {
    /// Store rooted at `<data_dir>/plans`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("plans"),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slug(name)))
    }
}

impl PlanStore for JsonFilePlanStore {
    fn load(&self, name: &str) -> Result<Plan> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(Error::PlanNotFound(name.to_string()));
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let plan: Plan = serde_json::from_str(&contents)?;
        tracing::debug!(
            "Loaded plan '{}' ({} exercises) from {:?}",
            plan.name,
            plan.exercises.len(),
            path
        );
        Ok(plan)
    }

    fn save(&mut self, plan: &Plan) -> Result<HashMap<TempId, String>> {
        std::fs::create_dir_all(&self.dir)?;

        let mut stored = plan.clone();
        stored.updated_at = Utc::now();

        let mut assigned = HashMap::new();
        for slot in &mut stored.exercises {
            if let SlotId::Temp(temp) = slot.id {
                let id = format!("ex-{}", Uuid::new_v4().simple());
                assigned.insert(temp, id.clone());
                slot.id = SlotId::Stored(id);
            }
        }

        let path = self.path_for(&plan.name);
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &stored)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(
            "Saved plan '{}' to {:?} ({} new ids)",
            plan.name,
            path,
            assigned.len()
        );
        Ok(assigned)
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Plan>(&contents) {
                Ok(plan) => names.push(plan.name),
                Err(e) => tracing::warn!("Skipping unreadable plan {:?}: {}", path, e),
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(Error::PlanNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        tracing::debug!("Deleted plan '{}'", name);
        Ok(())
    }
}

/// File-name-safe form of a plan name
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "plan".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::{create_pair, PairInput};
    use crate::session::{Command, EditSession};
    use crate::ExerciseSpec;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Treino A - Peito"), "treino-a-peito");
        assert_eq!(slug("  Ficha João  "), "ficha-joão");
        assert_eq!(slug("///"), "plan");
    }

    #[test]
    fn test_save_assigns_stored_ids_and_loads_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFilePlanStore::new(temp_dir.path());

        let seq = Sequence::new();
        let seq = create_pair(
            &seq,
            PairInput::New(
                ExerciseSpec::new("Supino", "Peito", "10-12"),
                ExerciseSpec::new("Crucifixo", "Peito", "12"),
            ),
            3,
            90,
        )
        .unwrap();

        let mut plan = Plan::new("Treino A", Some("Maria".into()));
        plan.set_sequence(seq.clone());

        let assigned = store.save(&plan).unwrap();
        assert_eq!(assigned.len(), 2);

        let loaded = store.load("Treino A").unwrap();
        assert_eq!(loaded.id, plan.id);
        assert_eq!(loaded.student.as_deref(), Some("Maria"));
        let loaded_seq = loaded.sequence().unwrap();
        assert_eq!(loaded_seq, seq.reconcile_ids(&assigned));
        assert!(loaded_seq.iter().all(|s| !s.id.is_temp()));
    }

    #[test]
    fn test_session_reconciles_after_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFilePlanStore::new(temp_dir.path());

        let mut session = EditSession::open(Sequence::new());
        session
            .apply(Command::AddExercise(ExerciseSpec::new("Agachamento", "Quadríceps", "8")))
            .unwrap();

        let mut plan = Plan::new("Pernas", None);
        plan.set_sequence(session.commit());
        let assigned = store.save(&plan).unwrap();
        session.reconcile_ids(&assigned);

        let loaded = store.load("Pernas").unwrap().sequence().unwrap();
        assert_eq!(session.committed(), &loaded);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_load_missing_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFilePlanStore::new(temp_dir.path());
        assert!(matches!(store.load("nope"), Err(Error::PlanNotFound(_))));
    }

    #[test]
    fn test_list_and_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFilePlanStore::new(temp_dir.path());
        assert!(store.list().unwrap().is_empty());

        store.save(&Plan::new("Treino B", None)).unwrap();
        store.save(&Plan::new("Treino A", None)).unwrap();
        assert_eq!(store.list().unwrap(), vec!["Treino A", "Treino B"]);

        store.delete("Treino A").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Treino B"]);
        assert!(!store.exists("Treino A"));
    }

    #[test]
    fn test_corrupted_exercise_list_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFilePlanStore::new(temp_dir.path());

        let (seq, _) = Sequence::new().append(ExerciseSpec::new("Remada", "Costas", "10"));
        let mut plan = Plan::new("Costas", None);
        plan.set_sequence(seq);
        plan.exercises[0].order = 3;
        store.save(&plan).unwrap();

        let loaded = store.load("Costas").unwrap();
        assert!(matches!(loaded.sequence(), Err(Error::InvalidPlan(_))));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFilePlanStore::new(temp_dir.path());
        store.save(&Plan::new("Treino", None)).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("plans"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("treino.json")]);
    }
}
