use clap::{Args, Parser, Subcommand, ValueEnum};
use ficha_core::export::{export_plan_csv, pair_labels};
use ficha_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ficha")]
#[command(about = "Workout plan editor with Bi-Set pairing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Plan to work on
    #[arg(long, short, global = true, default_value = "default")]
    plan: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty plan
    New {
        /// Student the plan belongs to
        #[arg(long)]
        student: Option<String>,
    },

    /// List stored plans
    List,

    /// Delete the plan file
    Remove,

    /// Print the plan
    Show {
        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// Append an exercise
    Add(ExerciseArgs),

    /// Insert an exercise after a position
    Insert {
        /// Position to insert after
        #[arg(long)]
        after: u32,

        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// Edit the exercise at a position
    Edit(EditArgs),

    /// Delete the exercise at a position (its Bi-Set is dissolved)
    Delete { position: u32 },

    /// Pair two existing exercises into a Bi-Set
    Pair {
        first: u32,
        second: u32,

        #[command(flatten)]
        shared: SharedArgs,
    },

    /// Append two new exercises as a Bi-Set
    PairNew(PairNewArgs),

    /// Change the sets and rest of the Bi-Set at a position
    EditPair {
        position: u32,

        #[command(flatten)]
        shared: SharedArgs,
    },

    /// Split the Bi-Set at a position into standalone exercises
    Unpair { position: u32 },

    /// Move an exercise (or its whole Bi-Set) one step
    Move {
        position: u32,

        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// Export the plan to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct ExerciseArgs {
    #[arg(long)]
    name: String,

    /// Muscle group (see the built-in vocabulary)
    #[arg(long)]
    muscle: String,

    /// Rep scheme, e.g. "10-12"
    #[arg(long)]
    reps: String,

    #[arg(long)]
    sets: Option<u32>,

    /// Rest after the exercise, in seconds
    #[arg(long)]
    rest: Option<u32>,

    #[arg(long)]
    notes: Option<String>,

    #[arg(long)]
    technique: Option<String>,

    #[arg(long)]
    video: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    position: u32,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    muscle: Option<String>,

    #[arg(long)]
    reps: Option<String>,

    #[arg(long)]
    sets: Option<u32>,

    #[arg(long)]
    rest: Option<u32>,

    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,

    #[arg(long)]
    clear_notes: bool,

    #[arg(long, conflicts_with = "clear_technique")]
    technique: Option<String>,

    #[arg(long)]
    clear_technique: bool,

    #[arg(long, conflicts_with = "clear_video")]
    video: Option<String>,

    #[arg(long)]
    clear_video: bool,
}

#[derive(Args)]
struct SharedArgs {
    /// Sets shared by both exercises
    #[arg(long)]
    sets: Option<u32>,

    /// Rest after the pair, in seconds
    #[arg(long)]
    rest: Option<u32>,
}

#[derive(Args)]
struct PairNewArgs {
    #[arg(long)]
    a_name: String,
    #[arg(long)]
    a_muscle: String,
    #[arg(long)]
    a_reps: String,

    #[arg(long)]
    b_name: String,
    #[arg(long)]
    b_muscle: String,
    #[arg(long)]
    b_reps: String,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(d: MoveDirection) -> Self {
        match d {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

/// Shared context for commands that edit a plan
struct Editor<'a> {
    store: JsonFilePlanStore,
    config: &'a Config,
    taxonomy: Taxonomy,
}

fn main() -> ExitCode {
    ficha_core::logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let mut editor = Editor {
        store: JsonFilePlanStore::new(&data_dir),
        config: &config,
        taxonomy: Taxonomy::from_config(&config.taxonomy),
    };
    let plan = cli.plan.as_str();

    match cli.command {
        Commands::New { student } => cmd_new(&mut editor.store, plan, student),
        Commands::List => cmd_list(&editor.store),
        Commands::Remove => cmd_remove(&mut editor.store, plan),
        Commands::Show { json } => cmd_show(&editor.store, plan, json),
        Commands::Export { out } => cmd_export(&editor.store, plan, &out),
        edit => editor.edit(plan, edit),
    }
}

fn cmd_new(store: &mut JsonFilePlanStore, name: &str, student: Option<String>) -> Result<()> {
    if store.exists(name) {
        return Err(Error::Other(format!("Plan '{}' already exists", name)));
    }
    store.save(&Plan::new(name, student))?;
    println!("✓ Created plan '{}'", name);
    Ok(())
}

fn cmd_list(store: &JsonFilePlanStore) -> Result<()> {
    let names = store.list()?;
    if names.is_empty() {
        println!("No plans yet.");
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_remove(store: &mut JsonFilePlanStore, name: &str) -> Result<()> {
    store.delete(name)?;
    println!("✓ Removed plan '{}'", name);
    Ok(())
}

fn cmd_show(store: &JsonFilePlanStore, name: &str, json: bool) -> Result<()> {
    let plan = store.load(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        display_plan(&plan, &plan.sequence()?);
    }
    Ok(())
}

fn cmd_export(store: &JsonFilePlanStore, name: &str, out: &Path) -> Result<()> {
    let plan = store.load(name)?;
    let count = export_plan_csv(&plan, out)?;
    println!("✓ Exported {} exercises to {}", count, out.display());
    Ok(())
}

impl Editor<'_> {
    /// Open a session on the stored plan, apply one command, commit and save
    fn edit(&mut self, name: &str, command: Commands) -> Result<()> {
        let mut plan = self.store.load(name)?;
        let mut session = EditSession::open(plan.sequence()?)
            .with_default_technique(self.config.editor.default_technique.clone());

        let (command, summary) = self.build(session.staging(), command)?;
        session.apply(command)?;

        plan.set_sequence(session.commit());
        let assigned = self.store.save(&plan)?;
        session.reconcile_ids(&assigned);
        plan.set_sequence(session.committed().clone());

        tracing::info!("Saved plan '{}' after {}", plan.name, summary);
        println!("✓ {}", summary);
        display_plan(&plan, session.committed());
        Ok(())
    }

    /// Translate CLI arguments into a core command and a summary line
    fn build(&self, seq: &Sequence, command: Commands) -> Result<(Command, String)> {
        let built = match command {
            Commands::Add(args) => {
                let spec = self.spec(args)?;
                let summary = format!("Added {}", spec.name);
                (Command::AddExercise(spec), summary)
            }
            Commands::Insert { after, exercise } => {
                let after = slot_at(seq, after)?;
                let spec = self.spec(exercise)?;
                let summary = format!("Inserted {}", spec.name);
                (Command::InsertExercise { after, spec }, summary)
            }
            Commands::Edit(args) => {
                let id = slot_at(seq, args.position)?;
                let summary = format!("Edited exercise {}", args.position);
                let patch = self.patch(args)?;
                (Command::EditExercise { id, patch }, summary)
            }
            Commands::Delete { position } => {
                let id = slot_at(seq, position)?;
                (
                    Command::DeleteExercise(id),
                    format!("Deleted exercise {}", position),
                )
            }
            Commands::Pair {
                first,
                second,
                shared,
            } => {
                let input = PairInput::Existing(slot_at(seq, first)?, slot_at(seq, second)?);
                let (set_count, rest_seconds) = self.shared(&shared);
                (
                    Command::CreatePair {
                        input,
                        set_count,
                        rest_seconds,
                    },
                    format!("Paired {} and {} as a Bi-Set", first, second),
                )
            }
            Commands::PairNew(args) => {
                let a = ExerciseSpec::new(
                    args.a_name,
                    self.muscle_group(&args.a_muscle)?,
                    args.a_reps,
                );
                let b = ExerciseSpec::new(
                    args.b_name,
                    self.muscle_group(&args.b_muscle)?,
                    args.b_reps,
                );
                let summary = format!("Added Bi-Set {} + {}", a.name, b.name);
                let (set_count, rest_seconds) = self.shared(&args.shared);
                (
                    Command::CreatePair {
                        input: PairInput::New(a, b),
                        set_count,
                        rest_seconds,
                    },
                    summary,
                )
            }
            Commands::EditPair { position, shared } => {
                let group_id = group_at(seq, position)?;
                let (set_count, rest_seconds) = self.shared(&shared);
                (
                    Command::EditPair {
                        group_id,
                        set_count,
                        rest_seconds,
                    },
                    format!("Updated Bi-Set at {}", position),
                )
            }
            Commands::Unpair { position } => (
                Command::DissolvePair(group_at(seq, position)?),
                format!("Dissolved Bi-Set at {}", position),
            ),
            Commands::Move {
                position,
                direction,
            } => (
                Command::MoveExercise {
                    id: slot_at(seq, position)?,
                    direction: direction.into(),
                },
                format!("Moved exercise {}", position),
            ),
            Commands::New { .. }
            | Commands::List
            | Commands::Remove
            | Commands::Show { .. }
            | Commands::Export { .. } => {
                return Err(Error::Other("Not an editing command".into()));
            }
        };
        Ok(built)
    }

    fn spec(&self, args: ExerciseArgs) -> Result<ExerciseSpec> {
        let editor = &self.config.editor;
        Ok(ExerciseSpec {
            name: args.name,
            muscle_group: self.muscle_group(&args.muscle)?,
            rep_scheme: args.reps,
            set_count: args.sets.unwrap_or(editor.default_set_count),
            rest_seconds: args.rest.unwrap_or(editor.default_rest_seconds),
            notes: args.notes,
            technique: args.technique,
            video_ref: args.video,
        })
    }

    fn patch(&self, args: EditArgs) -> Result<ExercisePatch> {
        let muscle_group = match args.muscle {
            Some(m) => Some(self.muscle_group(&m)?),
            None => None,
        };
        let patch = ExercisePatch {
            name: args.name,
            muscle_group,
            rep_scheme: args.reps,
            set_count: args.sets,
            rest_seconds: args.rest,
            notes: optional_field(args.notes, args.clear_notes),
            technique: optional_field(args.technique, args.clear_technique),
            video_ref: optional_field(args.video, args.clear_video),
        };
        if patch.is_empty() {
            return Err(Error::Other("Nothing to edit".into()));
        }
        Ok(patch)
    }

    fn shared(&self, args: &SharedArgs) -> (u32, u32) {
        let editor = &self.config.editor;
        (
            args.sets.unwrap_or(editor.default_set_count),
            args.rest.unwrap_or(editor.default_rest_seconds),
        )
    }

    /// Muscle groups are checked here, by the caller, not by the editing core
    fn muscle_group(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            // Left for the core to report as an incomplete exercise
            return Ok(String::new());
        }
        self.taxonomy
            .canonical(name)
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::Other(format!(
                    "Unknown muscle group '{}'. Known groups: {}",
                    name,
                    self.taxonomy.names().join(", ")
                ))
            })
    }
}

fn optional_field(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn slot_at(seq: &Sequence, position: u32) -> Result<SlotId> {
    seq.at_order(position)
        .map(|s| s.id.clone())
        .ok_or_else(|| Error::Other(format!("No exercise at position {}", position)))
}

fn group_at(seq: &Sequence, position: u32) -> Result<GroupId> {
    let slot = seq
        .at_order(position)
        .ok_or_else(|| Error::Other(format!("No exercise at position {}", position)))?;
    slot.pairing.group_id().ok_or_else(|| {
        Error::Other(format!(
            "Exercise {} ({}) is not part of a Bi-Set",
            position, slot.name
        ))
    })
}

fn display_plan(plan: &Plan, seq: &Sequence) {
    println!();
    match &plan.student {
        Some(student) => println!("  {} ({})", plan.name, student),
        None => println!("  {}", plan.name),
    }
    println!("  ─────────────────────────────────────────");

    if seq.is_empty() {
        println!("  (no exercises)");
        println!();
        return;
    }

    let labels = pair_labels(seq);
    for slot in seq {
        let label = labels.get(&slot.id).map(String::as_str).unwrap_or("");
        println!(
            "  {:>2}. {:<3} {:<24} {:<18} {} x {:<8} rest {}s{}",
            slot.order,
            label,
            slot.name,
            slot.muscle_group,
            slot.set_count,
            slot.rep_scheme,
            slot.rest_seconds,
            slot.technique
                .as_deref()
                .map(|t| format!("  [{}]", t))
                .unwrap_or_default(),
        );
        if let Some(notes) = &slot.notes {
            println!("         ↳ {}", notes);
        }
    }
    println!();
}
