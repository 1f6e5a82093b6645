use clap::{Parser, Subcommand};
use gallery_core::{BloggerId, PictureCategory, PictureId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallery")]
#[command(author, version, about = "Blogger picture gallery management")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Gallery(GalleryCommand),

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Commands that open the picture store.
#[derive(Subcommand)]
pub enum GalleryCommand {
    /// Upload an image file into a blogger's gallery
    Upload {
        /// Image file to upload
        #[arg(required = true)]
        file: PathBuf,

        /// Owning blogger
        #[arg(long)]
        owner: BloggerId,

        /// Category (default, private, public, avatar, banner)
        #[arg(long, default_value = "default")]
        category: PictureCategory,

        /// Title (defaults to the stored file name)
        #[arg(long)]
        title: Option<String>,

        /// Caption
        #[arg(long)]
        caption: Option<String>,
    },

    /// List a blogger's pictures as JSON lines
    List {
        #[arg(long)]
        owner: BloggerId,

        #[arg(long)]
        category: Option<PictureCategory>,

        #[arg(long, default_value = "0")]
        offset: i64,

        /// Page size (uses listing.default_rows if not specified)
        #[arg(long)]
        rows: Option<i64>,
    },

    /// Show a single picture
    Show {
        id: PictureId,

        /// Only show the picture if it belongs to this blogger
        #[arg(long)]
        owner: Option<BloggerId>,
    },

    /// Change caption, title or category of a picture
    Update {
        id: PictureId,

        #[arg(long)]
        category: Option<PictureCategory>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        caption: Option<String>,

        /// Remove the caption
        #[arg(long, conflicts_with = "caption")]
        clear_caption: bool,
    },

    /// Delete a picture
    Delete {
        id: PictureId,

        /// Keep the file on disk and only remove the record
        #[arg(long)]
        keep_file: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_upload() {
        let cli = Cli::try_parse_from([
            "gallery", "upload", "me.png", "--owner", "7", "--category", "avatar",
        ])
        .unwrap();
        match cli.command {
            Commands::Gallery(GalleryCommand::Upload { owner, category, title, .. }) => {
                assert_eq!(owner, BloggerId::from(7));
                assert_eq!(category, PictureCategory::Avatar);
                assert!(title.is_none());
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn parses_clear_caption() {
        let cli = Cli::try_parse_from(["gallery", "update", "3", "--clear-caption"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Gallery(GalleryCommand::Update {
                clear_caption: true,
                caption: None,
                ..
            })
        ));

        let both = Cli::try_parse_from([
            "gallery", "update", "3", "--caption", "x", "--clear-caption",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn rejects_unknown_category() {
        let result = Cli::try_parse_from([
            "gallery", "list", "--owner", "7", "--category", "wallpaper",
        ]);
        assert!(result.is_err());
    }
}
