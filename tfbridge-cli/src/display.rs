use colored::{ColoredString, Colorize};
use tfbridge_core::{ChangeStatus, HistoryItem};

pub fn status_icon(status: ChangeStatus) -> ColoredString {
    match status {
        ChangeStatus::Add => "+".green(),
        ChangeStatus::Edit => "~".yellow(),
        ChangeStatus::Delete => "-".red(),
        ChangeStatus::Rename => "→".blue(),
        ChangeStatus::None => "?".dimmed(),
    }
}

pub fn inclusion_marker(included: bool) -> ColoredString {
    if included {
        "[x]".green()
    } else {
        "[ ]".dimmed()
    }
}

pub fn print_history_item(item: &HistoryItem) {
    println!(
        "{} {}",
        "changeset".yellow().bold(),
        item.changeset_id.to_string().yellow()
    );
    println!("{}: {}", "Author".bold(), item.author);
    println!("{}: {}", "Date".bold(), item.date);
    if let Some(comment) = &item.comment {
        println!();
        println!("    {}", comment);
    }
    println!();
}
