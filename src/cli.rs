//! Command-line interface.

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::db::question_bank::{sub_topic_export_file_name, BANK_EXPORT_FILE_NAME};
use crate::db::{QuestionBankStore, SharedStorage};
use crate::error::{QuizError, Result};
use crate::file_io::{read_import_file, resolve_export_path, write_export};
use crate::models::ModuleId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "exam-prep")]
#[command(author, version, about = "Certification exam practice quizzes in the terminal")]
#[command(long_about = r#"
Runs multiple-choice practice quizzes per exam module from a local question bank.
Without a subcommand the interactive terminal UI starts.

Configuration files are loaded from (in priority order):
1. EXAM_PREP_* environment variables (e.g. EXAM_PREP_ADMIN__PASSWORD)
2. --config <path>     Explicit config file
3. ./exam-prep.toml    Project-level config
4. ~/.config/exam-prep/config.toml   Global config

Set OPENROUTER_API_KEY to enable AI question suggestions in the editor.
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Exam catalog JSON to use instead of the built-in one
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Write the whole question bank to a JSON file
    ExportBank {
        /// Output file or directory (defaults to the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the whole question bank from a JSON file
    ImportBank { file: PathBuf },
    /// Write one sub-topic's questions to a JSON file
    ExportTopic {
        module: ModuleId,
        sub_topic: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace one sub-topic's questions from a JSON array
    ImportTopic {
        module: ModuleId,
        sub_topic: String,
        file: PathBuf,
    },
}

fn check_sub_topic(catalog: &Catalog, module_id: ModuleId, sub_topic: &str) -> Result<()> {
    let module = catalog
        .module(module_id)
        .ok_or_else(|| QuizError::invalid_format(format!("Unknown module {}", module_id)))?;
    if module.sub_topic(sub_topic).is_none() {
        return Err(QuizError::invalid_format(format!(
            "Module {} has no sub-topic '{}'",
            module_id, sub_topic
        )));
    }
    Ok(())
}

fn output_input(output: &Option<PathBuf>) -> String {
    output
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Run a non-interactive command and describe what it did.
pub fn run_command(command: &Command, catalog: &Catalog, storage: SharedStorage, config: &AppConfig) -> Result<String> {
    let mut bank = QuestionBankStore::load(storage);
    let export_dir = &config.storage.export_dir;

    match command {
        Command::ExportBank { output } => {
            let json = bank.export_whole()?;
            let path = resolve_export_path(&output_input(output), export_dir, BANK_EXPORT_FILE_NAME);
            write_export(&path, json.as_bytes())?;
            Ok(format!("Exported question bank to {}", path.display()))
        }
        Command::ImportBank { file } => {
            let json = read_import_file(file)?;
            bank.import_whole(&json)?;
            Ok("Question bank imported successfully!".to_string())
        }
        Command::ExportTopic {
            module,
            sub_topic,
            output,
        } => {
            check_sub_topic(catalog, *module, sub_topic)?;
            let json = bank.export_sub_topic(*module, sub_topic)?;
            let path = resolve_export_path(
                &output_input(output),
                export_dir,
                &sub_topic_export_file_name(sub_topic),
            );
            write_export(&path, json.as_bytes())?;
            Ok(format!("Exported {} to {}", sub_topic, path.display()))
        }
        Command::ImportTopic {
            module,
            sub_topic,
            file,
        } => {
            check_sub_topic(catalog, *module, sub_topic)?;
            let json = read_import_file(file)?;
            let questions = bank.import_sub_topic(*module, sub_topic, &json)?;
            Ok(format!(
                "Successfully imported {} questions for {}.",
                questions.len(),
                sub_topic
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::simple_module;
    use crate::db::MemoryStorage;
    use std::rc::Rc;

    fn catalog() -> Catalog {
        Catalog::single_exam("Test", vec![simple_module(3, "Scanning Networks", &["Port scanning"])])
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["exam-prep", "import-topic", "3", "Port scanning", "q.json"]);
        assert_eq!(
            cli.command,
            Some(Command::ImportTopic {
                module: 3,
                sub_topic: "Port scanning".to_string(),
                file: PathBuf::from("q.json"),
            })
        );

        let cli = Cli::parse_from(["exam-prep", "--config", "x.toml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_topic_import_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut config = AppConfig::default();
        config.storage.export_dir = dir.path().to_path_buf();

        let file = dir.path().join("in.json");
        std::fs::write(
            &file,
            r#"[{"id": "q1", "question": "Q?", "options": ["a", "b"], "correctAnswer": "a"}]"#,
        )
        .unwrap();

        let import = Command::ImportTopic {
            module: 3,
            sub_topic: "Port scanning".to_string(),
            file,
        };
        let message = run_command(&import, &catalog(), Rc::new(storage.clone()), &config).unwrap();
        assert_eq!(message, "Successfully imported 1 questions for Port scanning.");

        let export = Command::ExportTopic {
            module: 3,
            sub_topic: "Port scanning".to_string(),
            output: None,
        };
        run_command(&export, &catalog(), Rc::new(storage), &config).unwrap();
        assert!(dir.path().join("port_scanning_questions.json").exists());
    }

    #[test]
    fn test_unknown_sub_topic_is_rejected() {
        let command = Command::ExportTopic {
            module: 3,
            sub_topic: "Nope".to_string(),
            output: None,
        };
        let err = run_command(&command, &catalog(), Rc::new(MemoryStorage::new()), &AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidFormat(_)));
    }

    #[test]
    fn test_export_empty_bank_fails() {
        let command = Command::ExportBank { output: None };
        let err = run_command(&command, &catalog(), Rc::new(MemoryStorage::new()), &AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, QuizError::EmptyBank));
    }
}
