use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "vessels" (
                "mmsi" text PRIMARY KEY,
                "imo" text,
                "name" text,
                "flag" text,
                "vessel_type" text,
                "deadweight" integer,
                "created_at" timestamptz NOT NULL DEFAULT now(),
                "updated_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE TABLE "ports" (
                "id" uuid PRIMARY KEY,
                "unlocode" text NOT NULL UNIQUE,
                "name" text NOT NULL,
                "lat" double precision NOT NULL,
                "lon" double precision NOT NULL,
                "geofence_radius_km" double precision NOT NULL,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE TABLE "vessel_positions" (
                "id" bigserial PRIMARY KEY,
                "vessel_mmsi" text NOT NULL,
                "timestamp_utc" timestamptz NOT NULL,
                "lat" double precision NOT NULL,
                "lon" double precision NOT NULL,
                "sog" double precision,
                "cog" double precision,
                "nav_status" text NOT NULL,
                "destination" text,
                "eta" timestamptz,
                "created_at" timestamptz NOT NULL DEFAULT now()
            );

            CREATE INDEX "idx_vessel_positions_vessel_time"
                ON "vessel_positions" ("vessel_mmsi", "timestamp_utc" DESC);

            CREATE TABLE "port_calls" (
                "id" uuid PRIMARY KEY,
                "vessel_mmsi" text NOT NULL,
                "port_id" uuid NOT NULL REFERENCES "ports"("id"),
                "call_type" text NOT NULL,
                "status" text NOT NULL,
                "arrival_time" timestamptz NOT NULL,
                "departure_time" timestamptz,
                "berth_time_hours" double precision,
                "created_at" timestamptz NOT NULL DEFAULT now(),
                "updated_at" timestamptz NOT NULL DEFAULT now(),
                CONSTRAINT "departure_after_arrival" CHECK (
                    "departure_time" IS NULL OR "departure_time" > "arrival_time"
                )
            );

            CREATE UNIQUE INDEX "idx_port_calls_one_open_per_vessel"
                ON "port_calls" ("vessel_mmsi")
                WHERE "status" = 'in_port';

            CREATE INDEX "idx_port_calls_port_arrival" ON "port_calls" ("port_id", "arrival_time");
            CREATE INDEX "idx_port_calls_port_departure" ON "port_calls" ("port_id", "departure_time");

            COMMENT ON TABLE "vessels" IS 'Vessel identities, keyed by MMSI. Never deleted.';
            COMMENT ON TABLE "port_calls" IS 'Open or closed vessel dwell intervals at a port.';
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "port_calls";
            DROP TABLE "vessel_positions";
            DROP TABLE "ports";
            DROP TABLE "vessels";
        "#;
        crate::from_sql(manager, sql).await
    }
}
