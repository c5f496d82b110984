use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS townhall;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO townhall, public;")
            .await?;

        // Grant the base DB user that will execute all platform queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE townhall TO townhall;
                    GRANT ALL ON SCHEMA townhall TO townhall;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall GRANT ALL ON TABLES TO townhall;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall GRANT ALL ON SEQUENCES TO townhall;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall GRANT ALL ON FUNCTIONS TO townhall;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall REVOKE ALL ON FUNCTIONS FROM townhall;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall REVOKE ALL ON SEQUENCES FROM townhall;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA townhall REVOKE ALL ON TABLES FROM townhall;
                    REVOKE ALL ON SCHEMA townhall FROM townhall;
                    REVOKE ALL PRIVILEGES ON DATABASE townhall FROM townhall;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS townhall CASCADE;")
            .await?;

        Ok(())
    }
}
