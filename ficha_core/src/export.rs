//! CSV export of a plan for printing.
//!
//! Bi-Set members are labelled in the usual gym notation: the first pair in
//! the plan is `A1`/`A2`, the second `B1`/`B2`, and so on.

use crate::pairing::groups;
use crate::sequence::Sequence;
use crate::{Plan, Result, SlotId};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    order: u32,
    name: &'a str,
    muscle_group: &'a str,
    sets: u32,
    reps: &'a str,
    rest_seconds: u32,
    technique: Option<&'a str>,
    pair: Option<&'a str>,
    notes: Option<&'a str>,
}

/// `A1`/`A2`, `B1`/`B2`, ... for each pair in sequence order
pub fn pair_labels(seq: &Sequence) -> HashMap<SlotId, String> {
    let mut labels = HashMap::new();
    for (index, pair) in groups(seq).into_iter().enumerate() {
        let letter = group_letter(index);
        labels.insert(pair.first, format!("{}1", letter));
        labels.insert(pair.second, format!("{}2", letter));
    }
    labels
}

fn group_letter(index: usize) -> String {
    let mut n = index;
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Write the plan's exercises as CSV, returning the number of rows
pub fn write_plan_csv<W: io::Write>(plan: &Plan, writer: W) -> Result<usize> {
    let seq = plan.sequence()?;
    let labels = pair_labels(&seq);
    let mut csv_writer = csv::Writer::from_writer(writer);

    for slot in &seq {
        csv_writer.serialize(CsvRow {
            order: slot.order,
            name: &slot.name,
            muscle_group: &slot.muscle_group,
            sets: slot.set_count,
            reps: &slot.rep_scheme,
            rest_seconds: slot.rest_seconds,
            technique: slot.technique.as_deref(),
            pair: labels.get(&slot.id).map(String::as_str),
            notes: slot.notes.as_deref(),
        })?;
    }

    csv_writer.flush()?;
    Ok(seq.len())
}

/// Export a plan to a CSV file
pub fn export_plan_csv(plan: &Plan, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let count = write_plan_csv(plan, io::BufWriter::new(file))?;
    tracing::info!("Exported {} exercises of '{}' to {:?}", count, plan.name, path);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::{create_pair, PairInput};
    use crate::ExerciseSpec;

    fn sample_plan() -> Plan {
        let (seq, _) = Sequence::new().append(ExerciseSpec::new("Agachamento", "Quadríceps", "8"));
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
        let mut plan = Plan::new("Treino A", None);
        plan.set_sequence(seq);
        plan
    }

    #[test]
    fn test_group_letters() {
        assert_eq!(group_letter(0), "A");
        assert_eq!(group_letter(25), "Z");
        assert_eq!(group_letter(26), "AA");
        assert_eq!(group_letter(27), "AB");
    }

    #[test]
    fn test_write_plan_csv() {
        let plan = sample_plan();
        let mut buf = Vec::new();

        let count = write_plan_csv(&plan, &mut buf).unwrap();
        assert_eq!(count, 3);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "order,name,muscle_group,sets,reps,rest_seconds,technique,pair,notes"
        );
        assert_eq!(lines[1], "1,Agachamento,Quadríceps,3,8,60,,,");
        assert_eq!(lines[2], "2,Supino,Peito,3,10-12,0,Bi-Set,A1,");
        assert_eq!(lines[3], "3,Crucifixo,Peito,3,12,90,Bi-Set,A2,");
    }

    #[test]
    fn test_export_plan_csv_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("treino.csv");

        let count = export_plan_csv(&sample_plan(), &path).unwrap();
        assert_eq!(count, 3);
        assert!(std::fs::read_to_string(&path).unwrap().contains("Crucifixo"));
    }
}
