use clap::Parser;
use eyre::Context;
use mbs_domain::Catalog;
use mbs_orm::Database;
use tracing::info;

use crate::Connection;

/// Show where a student's dissertation stands
#[derive(Parser, Debug)]
pub struct Status {
    #[arg(long)]
    student_id: i64,
}

impl Status {
    pub async fn run(&self, connection: &Connection) -> eyre::Result<()> {
        let database = Database::connect(connection.config()?)
            .await
            .context("Failed to connect to database")?;
        let catalog = Catalog::new().context("Inconsistent entity definitions")?;
        let mut pooled = database.acquire().await?;

        let Some(info) = catalog
            .dissertation_info(&mut pooled, self.student_id)
            .await?
        else {
            info!(student_id = self.student_id, "No dissertation scheduled");
            return Ok(());
        };

        info!(
            student_id = info.student_id,
            date = %info.formatted_date().unwrap_or_default(),
            time = %info.formatted_time().unwrap_or_default(),
            status = %info.status,
            "Dissertation"
        );
        info!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialize dissertation")?
        );

        Ok(())
    }
}
