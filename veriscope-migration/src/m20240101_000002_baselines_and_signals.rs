use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "port_daily_baselines" (
                "port_id" uuid NOT NULL REFERENCES "ports"("id"),
                "day" date NOT NULL,
                "arrivals" integer NOT NULL,
                "departures" integer NOT NULL,
                "unique_vessels" integer NOT NULL,
                "avg_dwell_hours" double precision,
                "open_calls" integer NOT NULL,
                "arrivals_30d_avg" double precision,
                "arrivals_30d_std" double precision,
                "dwell_30d_avg" double precision,
                "dwell_30d_std" double precision,
                "open_calls_30d_avg" double precision,
                "created_at" timestamptz NOT NULL DEFAULT now(),
                "updated_at" timestamptz NOT NULL DEFAULT now(),
                PRIMARY KEY ("port_id", "day")
            );

            CREATE TABLE "signals" (
                "id" uuid PRIMARY KEY,
                "signal_type" text NOT NULL,
                "entity_type" text NOT NULL,
                "entity_id" text NOT NULL,
                "day" date NOT NULL,
                "severity" text NOT NULL,
                "value" double precision NOT NULL,
                "baseline" double precision NOT NULL,
                "stddev" double precision,
                "zscore" double precision,
                "delta_pct" double precision,
                "confidence_score" double precision NOT NULL,
                "confidence_band" text NOT NULL,
                "method" text NOT NULL,
                "cluster_id" text NOT NULL,
                "cluster_key" text NOT NULL,
                "cluster_type" text NOT NULL,
                "cluster_severity" text NOT NULL,
                "cluster_summary" text NOT NULL,
                "explanation" text NOT NULL,
                "metadata" jsonb NOT NULL,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE UNIQUE INDEX "idx_signals_identity"
                ON "signals" ("signal_type", "entity_type", "entity_id", "day");

            CREATE INDEX "idx_signals_cluster" ON "signals" ("cluster_id");
            CREATE INDEX "idx_signals_day" ON "signals" ("day");

            COMMENT ON TABLE "port_daily_baselines" IS 'Daily aggregates plus trailing 30-day rolling moments per port.';
            COMMENT ON TABLE "signals" IS 'Typed anomaly signals, idempotent on (signal_type, entity_type, entity_id, day).';
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "signals";
            DROP TABLE "port_daily_baselines";
        "#;
        crate::from_sql(manager, sql).await
    }
}
