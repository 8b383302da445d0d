pub mod formatter;

pub use formatter::{
    format_notes, format_participant_detail, format_ranked_table, format_recognition,
    format_total, format_tsv, should_use_colors,
};
