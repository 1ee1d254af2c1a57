use std::path::PathBuf;

use reviewdb_core::InvalidRatingPolicy;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["reviewdb-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["reviewdb-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["reviewdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn import_run_requires_shop_and_file() {
    assert!(Cli::try_parse_from(["reviewdb-cli", "import", "run", "--file", "r.csv"]).is_err());
    assert!(Cli::try_parse_from(["reviewdb-cli", "import", "run", "--shop", "demo"]).is_err());
}

#[test]
fn import_run_defaults() {
    let cli = Cli::try_parse_from([
        "reviewdb-cli",
        "import",
        "run",
        "--shop",
        "demo.myshopify.com",
        "--file",
        "reviews.csv",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            command: ImportCommands::Run {
                ref shop,
                ref file,
                on_invalid_rating: None,
                dry_run: false,
            }
        }) if shop == "demo.myshopify.com" && file == &PathBuf::from("reviews.csv")
    ));
}

#[test]
fn import_run_with_skip_policy_and_dry_run() {
    let cli = Cli::try_parse_from([
        "reviewdb-cli",
        "import",
        "run",
        "--shop",
        "demo.myshopify.com",
        "--file",
        "reviews.csv",
        "--on-invalid-rating",
        "skip",
        "--dry-run",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            command: ImportCommands::Run {
                on_invalid_rating: Some(InvalidRatingPolicy::Skip),
                dry_run: true,
                ..
            }
        })
    ));
}

#[test]
fn import_run_rejects_unknown_policy() {
    let result = Cli::try_parse_from([
        "reviewdb-cli",
        "import",
        "run",
        "--shop",
        "demo.myshopify.com",
        "--file",
        "reviews.csv",
        "--on-invalid-rating",
        "drop",
    ]);
    assert!(result.is_err());
}

#[test]
fn import_preview_takes_a_file() {
    let cli = Cli::try_parse_from(["reviewdb-cli", "import", "preview", "--file", "r.csv"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            command: ImportCommands::Preview { ref file }
        }) if file == &PathBuf::from("r.csv")
    ));
}

#[test]
fn import_template_out_is_optional() {
    let cli = Cli::try_parse_from(["reviewdb-cli", "import", "template"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            command: ImportCommands::Template { out: None }
        })
    ));

    let cli =
        Cli::try_parse_from(["reviewdb-cli", "import", "template", "--out", "t.csv"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            command: ImportCommands::Template { out: Some(_) }
        })
    ));
}

#[test]
fn cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
