use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::store::DuplicatePolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect photo geotags into an ordered, undoable marker list")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Marker file to work on (defaults to the last used file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// What to do when a marker already exists
    #[arg(long, value_enum, default_value_t = OnDuplicate::Skip, global = true)]
    pub on_duplicate: OnDuplicate,

    /// Refuse marker files containing unreadable records
    #[arg(long, global = true)]
    pub strict: bool,

    /// Allow saving over a marker file whose unreadable records were skipped
    #[arg(long, global = true)]
    pub drop_invalid: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnDuplicate {
    Skip,
    Overwrite,
}

impl From<OnDuplicate> for DuplicatePolicy {
    fn from(value: OnDuplicate) -> Self {
        match value {
            OnDuplicate::Skip => DuplicatePolicy::Skip,
            OnDuplicate::Overwrite => DuplicatePolicy::Overwrite,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read GPS tags from image paths or URLs (comma-separated or separate arguments)
    Load {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Read GPS tags from every image below a folder
    Scan {
        #[arg(required = true)]
        folder: PathBuf,
    },

    /// Add a named location by coordinates
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Add a location by looking up an address
    Geocode {
        #[arg(required = true)]
        address: String,
    },

    /// Remove the first marker with this label
    Remove { label: String },

    /// Rename the first marker with this label
    Rename { old_label: String, new_label: String },

    /// Remove all markers
    Clear,

    /// Print the markers in order
    List,

    /// Total path distance along the markers, in miles
    Distance,

    /// Write the markers to a KML file
    ExportKml { destination: PathBuf },
}
