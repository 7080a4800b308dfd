use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "alert_subscriptions" (
                "id" uuid PRIMARY KEY,
                "tenant_id" uuid NOT NULL,
                "user_id" uuid NOT NULL,
                "scope" text NOT NULL,
                "entity_type" text,
                "entity_id" text,
                "severity_min" text NOT NULL,
                "confidence_min" double precision,
                "channel" text NOT NULL,
                "endpoint" text NOT NULL,
                "secret" text,
                "signature_version" text NOT NULL DEFAULT 'v1',
                "is_enabled" boolean NOT NULL DEFAULT true,
                "created_at" timestamptz NOT NULL DEFAULT now(),
                "updated_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "idx_alert_subscriptions_tenant" ON "alert_subscriptions" ("tenant_id", "is_enabled");

            CREATE TABLE "alert_dedupe" (
                "id" uuid PRIMARY KEY,
                "tenant_id" uuid NOT NULL,
                "cluster_id" text NOT NULL,
                "channel" text NOT NULL,
                "endpoint" text NOT NULL,
                "last_sent_at" timestamptz NOT NULL,
                "ttl_hours" integer NOT NULL
            );

            CREATE UNIQUE INDEX "idx_alert_dedupe_key"
                ON "alert_dedupe" ("tenant_id", "cluster_id", "channel", "endpoint");

            CREATE TABLE "alert_runs" (
                "id" uuid PRIMARY KEY,
                "tenant_id" uuid NOT NULL,
                "user_id" uuid,
                "status" text NOT NULL,
                "started_at" timestamptz NOT NULL,
                "finished_at" timestamptz,
                "summary" jsonb NOT NULL DEFAULT '{}'::jsonb,
                "error" text
            );

            CREATE TABLE "alert_deliveries" (
                "id" uuid PRIMARY KEY,
                "run_id" uuid NOT NULL REFERENCES "alert_runs"("id"),
                "subscription_id" uuid NOT NULL REFERENCES "alert_subscriptions"("id"),
                "cluster_id" text NOT NULL,
                "status" text NOT NULL,
                "attempts" integer NOT NULL DEFAULT 0,
                "last_http_status" integer,
                "latency_ms" integer,
                "sent_at" timestamptz,
                "error" text,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "idx_alert_deliveries_tenant_cursor"
                ON "alert_deliveries" ("subscription_id", "created_at" DESC, "id" DESC);

            CREATE TABLE "alert_delivery_attempts" (
                "id" uuid PRIMARY KEY,
                "delivery_id" uuid NOT NULL REFERENCES "alert_deliveries"("id"),
                "attempt_no" integer NOT NULL,
                "status" text NOT NULL,
                "http_status" integer,
                "latency_ms" integer,
                "error" text,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "idx_alert_delivery_attempts_delivery" ON "alert_delivery_attempts" ("delivery_id", "attempt_no");

            CREATE TABLE "alert_dlq" (
                "id" uuid PRIMARY KEY,
                "delivery_id" uuid NOT NULL UNIQUE REFERENCES "alert_deliveries"("id") ON DELETE CASCADE,
                "next_attempt_at" timestamptz NOT NULL,
                "attempt_count" integer NOT NULL DEFAULT 0,
                "max_attempts" integer NOT NULL,
                "last_error" text,
                "created_at" timestamptz NOT NULL DEFAULT now(),
                "updated_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "idx_alert_dlq_next_attempt" ON "alert_dlq" ("next_attempt_at");

            CREATE TABLE "api_keys" (
                "id" uuid PRIMARY KEY,
                "tenant_id" uuid NOT NULL,
                "user_id" uuid NOT NULL,
                "key_hash" text NOT NULL UNIQUE,
                "revoked_at" timestamptz,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            COMMENT ON TABLE "alert_dedupe" IS 'TTL dedupe key store, one row per (tenant, cluster, channel, endpoint).';
            COMMENT ON TABLE "alert_dlq" IS 'Dead-letter queue for deliveries exhausting in-call retries.';
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "api_keys";
            DROP TABLE "alert_dlq";
            DROP TABLE "alert_delivery_attempts";
            DROP TABLE "alert_deliveries";
            DROP TABLE "alert_runs";
            DROP TABLE "alert_dedupe";
            DROP TABLE "alert_subscriptions";
        "#;
        crate::from_sql(manager, sql).await
    }
}
