use std::fmt;

use crate::leaderboard::{LeaderboardEntry, SeasonLeaderboards};

/// How leaderboards are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render leaderboards in the requested format
pub fn render(boards: &[SeasonLeaderboards], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(boards.iter().map(|b| TextReport(b).to_string()).collect::<Vec<_>>().join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(boards),
    }
}

/// Aligned text tables for one season
pub struct TextReport<'a>(pub &'a SeasonLeaderboards);

impl TextReport<'_> {
    fn header(f: &mut fmt::Formatter<'_>, with_games: bool) -> fmt::Result {
        write!(f, "{:<4} {:<24} {:<5} {:<6} {:>7} {:>6} {:>6} {:>6}", "Rank", "Player", "Team", "Pos", "Rating", "PTS", "TRB", "AST")?;
        if with_games {
            write!(f, " {:>4} {:>4}", "G", "GS")?;
        }
        writeln!(f)
    }

    fn entry(f: &mut fmt::Formatter<'_>, entry: &LeaderboardEntry, with_games: bool) -> fmt::Result {
        write!(
            f,
            "{:<4} {:<24} {:<5} {:<6} {:>7.2} {:>6.1} {:>6.1} {:>6.1}",
            entry.rank,
            entry.name,
            entry.team,
            entry.position,
            entry.rating,
            entry.points,
            entry.total_rebounds,
            entry.assists
        )?;
        if with_games {
            write!(f, " {:>4} {:>4}", entry.games_played, entry.games_started)?;
        }
        writeln!(f)
    }

    fn table(f: &mut fmt::Formatter<'_>, title: &str, entries: &[LeaderboardEntry], with_games: bool) -> fmt::Result {
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        if entries.is_empty() {
            return writeln!(f, "(no qualifying players)");
        }

        Self::header(f, with_games)?;
        for entry in entries {
            Self::entry(f, entry, with_games)?;
        }
        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let boards = self.0;

        let title = format!(
            "Top {} players of {} ({}+ games)",
            boards.overall.len(),
            boards.season,
            boards.min_games
        );
        Self::table(f, &title, &boards.overall, false)?;

        for board in &boards.by_position {
            writeln!(f)?;
            let title = format!("Top {}s of {}", board.position.label(), boards.season);
            Self::table(f, &title, &board.entries, false)?;
        }

        for board in &boards.by_team {
            writeln!(f)?;
            let title = format!("Top players of {} in {}", board.team, boards.season);
            Self::table(f, &title, &board.entries, true)?;
        }

        Ok(())
    }
}
