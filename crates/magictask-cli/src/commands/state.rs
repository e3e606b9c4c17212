use clap::Subcommand;

use super::open_database;

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the stored app-state document as JSON
    Show,
}

pub fn run(action: StateAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    match action {
        StateAction::Show => {
            let doc = db.app_state_document()?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}
