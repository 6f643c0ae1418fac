use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

pub async fn run(name: String, owner: String, yes: bool) -> Result<()> {
    let root = super::workspace_root()?;
    let bridge = super::open_local(&root)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Apply shelveset '{}' from {} into this workspace?",
                name, owner
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    println!("{}", "Applying shelveset...".bold());
    bridge.client.apply_shelveset(&name, &owner).await?;

    println!(
        "{} {} {}",
        "✓ Applied shelveset".green().bold(),
        name.bold(),
        format!("(owner: {})", owner).dimmed()
    );

    Ok(())
}
