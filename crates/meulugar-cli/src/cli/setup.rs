use clap::{Args, Parser, Subcommand, ValueEnum};
use meulugar::query::SortBy;
use meulugar::Emotion;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meulugar", bin_name = "meulugar", version)]
#[command(about = "Journal of favorite places: where they are and how they feel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides MEULUGAR_DATA_DIR and meulugar.toml)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Place(PlaceCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum PlaceCommands {
    /// List places
    #[command(alias = "ls", display_order = 1)]
    List(ListArgs),

    /// Show one place in full
    #[command(alias = "v", display_order = 2)]
    Show {
        /// Place id or unique id prefix
        id: String,
    },

    /// Record a new place
    #[command(alias = "n", display_order = 3)]
    Add(PlaceFields),

    /// Change an existing place. Omitted fields keep their value.
    #[command(alias = "e", display_order = 4)]
    Edit {
        /// Place id or unique id prefix
        id: String,

        #[command(flatten)]
        fields: PlaceFields,
    },

    /// Delete a place
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Place id or unique id prefix
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Export places and portfolio as JSON (stdout unless --output)
    #[command(display_order = 10)]
    Export {
        /// File to write; a directory gets meu-lugar-<date>.json inside it
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Replace places and/or portfolio from an exported file
    #[command(display_order = 11)]
    Import {
        /// File produced by `meulugar export`
        file: PathBuf,
    },

    /// Erase every place, the portfolio and the settings
    #[command(display_order = 12)]
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Read, write or remove attachments
    #[command(display_order = 13)]
    Media {
        #[command(subcommand)]
        action: MediaCommands,
    },

    /// Delete attachments no place refers to
    #[command(display_order = 14)]
    Sweep,
}

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Write an attachment to a file, or raw to stdout
    Get {
        /// Attachment key, e.g. photo_<id>
        key: String,

        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Store a file under a key
    Put {
        /// Attachment key, e.g. photo_<id>
        key: String,

        file: PathBuf,
    },

    /// Remove an attachment
    Delete {
        /// Attachment key, e.g. photo_<id>
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// List every tag in use
    #[command(display_order = 20)]
    Tags,

    /// Count places, emotions and tags
    #[command(display_order = 21)]
    Stats,

    /// Show the effective configuration
    #[command(display_order = 22)]
    Config {
        /// Print a commented sample meulugar.toml instead
        #[arg(long)]
        template: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only places with this emotion
    #[arg(long, short, value_parser = parse_emotion)]
    pub emotion: Option<Emotion>,

    /// Only places with this tag (repeatable; any match)
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,

    /// Search title and description
    #[arg(long, short)]
    pub search: Option<String>,

    /// Sort key
    #[arg(long, value_enum, default_value_t = SortKey::Date)]
    pub sort: SortKey,

    /// Ascending order (default is descending)
    #[arg(long)]
    pub asc: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    #[default]
    Date,
    Title,
    Emotion,
}

impl From<SortKey> for SortBy {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Date => SortBy::Date,
            SortKey::Title => SortBy::Title,
            SortKey::Emotion => SortBy::Emotion,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PlaceFields {
    /// Name of the place
    #[arg(long)]
    pub title: Option<String>,

    /// What the place is like
    #[arg(long, short)]
    pub description: Option<String>,

    /// alegria, calma, curiosidade, medo or saudade
    #[arg(long, short, value_parser = parse_emotion)]
    pub emotion: Option<Emotion>,

    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Add a tag (repeatable)
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,

    /// Remove a tag (repeatable)
    #[arg(long = "untag", value_name = "TAG")]
    pub untags: Vec<String>,

    /// What is wrong with the place
    #[arg(long, value_name = "TEXT")]
    pub critical: Option<String>,

    /// What you would change about it
    #[arg(long, value_name = "TEXT")]
    pub change: Option<String>,

    /// How the space feels
    #[arg(long, value_name = "TEXT")]
    pub perception: Option<String>,

    /// Photo file to attach
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// Audio recording to attach
    #[arg(long, value_name = "FILE")]
    pub audio: Option<PathBuf>,
}

fn parse_emotion(s: &str) -> Result<Emotion, String> {
    s.parse::<Emotion>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_naked_invocation_has_no_command() {
        assert!(parse(&["meulugar"]).command.is_none());
    }

    #[test]
    fn test_add_accepts_negative_coordinates() {
        let cli = parse(&[
            "meulugar", "add", "--title", "Praia", "--lat", "-9.64", "--lng", "-35.70", "-t",
            "mar", "-t", "sol", "-e", "Alegria",
        ]);
        match cli.command {
            Some(Commands::Place(PlaceCommands::Add(fields))) => {
                assert_eq!(fields.lat, Some(-9.64));
                assert_eq!(fields.lng, Some(-35.70));
                assert_eq!(fields.tags, vec!["mar", "sol"]);
                assert_eq!(fields.emotion, Some(Emotion::Joy));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_emotion_is_rejected() {
        assert!(Cli::try_parse_from(["meulugar", "add", "-e", "raiva"]).is_err());
    }

    #[test]
    fn test_list_filters() {
        let cli = parse(&["meulugar", "list", "--sort", "title", "--asc", "-t", "sol"]);
        match cli.command {
            Some(Commands::Place(PlaceCommands::List(args))) => {
                assert_eq!(args.sort, SortKey::Title);
                assert!(args.asc);
                assert_eq!(args.tags, vec!["sol"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli = parse(&["meulugar", "clear", "--yes", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(
            cli.command,
            Some(Commands::Data(DataCommands::Clear { yes: true }))
        ));
    }

    #[test]
    fn test_media_subcommands() {
        let cli = parse(&["meulugar", "media", "put", "photo_abc", "foto.jpg"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Data(DataCommands::Media {
                action: MediaCommands::Put { .. }
            }))
        ));
    }
}
