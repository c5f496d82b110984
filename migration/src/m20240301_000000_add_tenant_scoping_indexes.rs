use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Every read of a tenant-owned table carries the tenant predicate, so each
// one gets an index on tenant_id; answers and tags are additionally listed
// per question.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("questions_tenant_id")
                    .table((Alias::new("townhall"), Alias::new("questions")))
                    .col(Alias::new("tenant_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("answers_tenant_id")
                    .table((Alias::new("townhall"), Alias::new("answers")))
                    .col(Alias::new("tenant_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("answers_question_id")
                    .table((Alias::new("townhall"), Alias::new("answers")))
                    .col(Alias::new("question_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("tags_tenant_id")
                    .table((Alias::new("townhall"), Alias::new("tags")))
                    .col(Alias::new("tenant_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("tags_question_id")
                    .table((Alias::new("townhall"), Alias::new("tags")))
                    .col(Alias::new("question_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("tags_question_id", "tags"),
            ("tags_tenant_id", "tags"),
            ("answers_question_id", "answers"),
            ("answers_tenant_id", "answers"),
            ("questions_tenant_id", "questions"),
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table((Alias::new("townhall"), Alias::new(table)))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
