use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start wordcue as an HTTP service.
    Daemon {
        /// Vocabulary file to load instead of the configured one
        #[clap(long)]
        vocabulary: Option<String>,
    },

    /// Print the deterministic starting words for a fresh session.
    Initial {
        /// Number of words to print
        #[clap(short, long)]
        k: Option<usize>,

        /// Vocabulary file to load instead of the configured one
        #[clap(long)]
        vocabulary: Option<String>,
    },

    /// Recommend next words for WORD.
    Recommend {
        /// The word the recommendations should follow
        word: String,

        /// Previously accepted word; repeat the flag to build up a sentence
        #[clap(short, long)]
        context: Vec<String>,

        /// Word to keep out of the result; repeatable
        #[clap(short = 'x', long)]
        exclude: Vec<String>,

        /// Number of words to recommend
        #[clap(short, long)]
        k: Option<usize>,

        /// Sample across categories instead of running the similarity funnel
        #[clap(short, long, default_value = "false")]
        diverse: bool,

        /// Vocabulary file to load instead of the configured one
        #[clap(long)]
        vocabulary: Option<String>,
    },

    /// Generate a sentence from the selected words.
    Generate {
        /// Words the sentence must contain, in selection order
        #[clap(required = true)]
        words: Vec<String>,
    },
}
