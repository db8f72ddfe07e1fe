use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use clinicdesk_core::constants::DEFAULT_STATE_DIR;
use clinicdesk_core::validation::Rule;
use clinicdesk_core::{
    preset_date, profile_completion, FilePatientStore, FollowUpPreset, PatientContext, PatientRef,
    TemplateCache,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clinicdesk")]
#[command(about = "ClinicDesk offline tools")]
struct Cli {
    /// Local state directory
    #[arg(long, global = true, env = "CLINICDESK_STATE_DIR", default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a value against one or more validation rules
    Validate {
        /// Rules, comma-separated (e.g. "required,phone" or "min:2,max:50")
        rules: String,
        /// Value to check
        value: String,
    },
    /// Compute a follow-up date from a preset
    Followup {
        /// Preset label (e.g. "7 Days", "1 Month")
        preset: String,
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List follow-up presets
    Presets,
    /// Score a doctor profile JSON file
    ProfileScore {
        /// Path to the profile JSON
        file: PathBuf,
    },
    /// Manage the locally selected patient
    Patient {
        #[command(subcommand)]
        action: PatientCommand,
    },
    /// Drop the cached onboarding template
    ClearTemplateCache,
}

#[derive(Subcommand)]
enum PatientCommand {
    /// Show the selected patient
    Show,
    /// Select a patient
    Select {
        /// Patient identifier
        id: String,
        /// Patient name
        name: String,
        /// Phone number (optional)
        #[arg(long)]
        phone: Option<String>,
    },
    /// Clear the selection
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate { rules, value }) => {
            let rules = rules
                .split(',')
                .map(str::parse::<Rule>)
                .collect::<Result<Vec<_>, _>>()?;
            match rules.iter().find_map(|rule| rule.apply(&value)) {
                Some(message) => {
                    println!("invalid: {}", message);
                    std::process::exit(1);
                }
                None => println!("valid"),
            }
        }
        Some(Commands::Followup { preset, today }) => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            match preset_date(&preset, today) {
                Ok(Some(date)) => println!("{}", date),
                Ok(None) => println!("Custom preset: pick the date by hand"),
                Err(e) => eprintln!("Error computing follow-up: {}", e),
            }
        }
        Some(Commands::Presets) => {
            for preset in FollowUpPreset::ALL {
                println!("{}", preset.label());
            }
        }
        Some(Commands::ProfileScore { file }) => {
            let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            match profile_completion(&payload) {
                Ok(completion) => {
                    println!("Profile {}% complete", completion.percentage);
                    for section in completion.sections {
                        let mark = if section.complete { "x" } else { " " };
                        println!(
                            "[{}] {} ({}/{}, weight {})",
                            mark, section.label, section.filled, section.total, section.weight
                        );
                        if !section.missing.is_empty() {
                            println!("      missing: {}", section.missing.join(", "));
                        }
                    }
                }
                Err(e) => eprintln!("Error scoring profile: {}", e),
            }
        }
        Some(Commands::Patient { action }) => {
            let mut context = PatientContext::new(FilePatientStore::new(&cli.state_dir));
            match action {
                PatientCommand::Show => match context.selected() {
                    Some(p) => println!("ID: {}, Name: {}", p.id, p.name),
                    None => println!("No patient selected."),
                },
                PatientCommand::Select { id, name, phone } => {
                    let mut patient = PatientRef::new(&id, &name)?;
                    patient.phone = phone;
                    match context.set_selected_patient(patient) {
                        Ok(_) => println!("Selected patient {}", id),
                        Err(e) => eprintln!("Error selecting patient: {}", e),
                    }
                }
                PatientCommand::Clear => match context.clear() {
                    Ok(_) => println!("Selection cleared"),
                    Err(e) => eprintln!("Error clearing selection: {}", e),
                },
            }
        }
        Some(Commands::ClearTemplateCache) => {
            match TemplateCache::new(&cli.state_dir).clear() {
                Ok(()) => println!("Onboarding template cache cleared"),
                Err(e) => eprintln!("Error clearing cache: {}", e),
            }
        }
        None => {
            println!("Use 'clinicdesk --help' for commands");
        }
    }

    Ok(())
}
