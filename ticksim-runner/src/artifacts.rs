//! Artefact persistence: orders and fills as CSV, stats and manifest as JSON.
//!
//! Every run writes into its own directory:
//! - `orders.csv`  : one row per accepted order, final state
//! - `fills.csv`   : one row per signed fill, RFC 3339 timestamps
//! - `stats.json`  : flat `{name: number}` map
//! - `manifest.json`: config, run id, symbols, schema version

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ticksim_core::{Fill, Order};

use crate::config::{BacktestConfig, RunId};

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

pub const ORDERS_FILE: &str = "orders.csv";
pub const FILLS_FILE: &str = "fills.csv";
pub const STATS_FILE: &str = "stats.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Describes how a run was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub run_id: Option<RunId>,
    pub config: Option<BacktestConfig>,
    pub symbols: Vec<String>,
}

impl Manifest {
    pub fn new(config: Option<&BacktestConfig>, symbols: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: config.map(BacktestConfig::run_id),
            config: config.cloned(),
            symbols,
        }
    }
}

/// Paths of the files a completed run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub orders: PathBuf,
    pub fills: PathBuf,
    pub stats: PathBuf,
    pub manifest: PathBuf,
}

impl ArtifactPaths {
    fn under(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            orders: dir.join(ORDERS_FILE),
            fills: dir.join(FILLS_FILE),
            stats: dir.join(STATS_FILE),
            manifest: dir.join(MANIFEST_FILE),
        }
    }
}

/// Writes one run's artefacts under a fixed directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    paths: ArtifactPaths,
}

impl ArtifactWriter {
    /// Root the writer at `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create artefact dir {}", dir.display()))?;
        Ok(Self {
            paths: ArtifactPaths::under(dir),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.paths.dir
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Columns: id, symbol, qty, side, type, limit_price, filled_qty, status.
    /// `limit_price` is empty for market orders.
    pub fn write_orders(&self, orders: &[Order]) -> Result<()> {
        let path = &self.paths.orders;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        wtr.write_record([
            "id",
            "symbol",
            "qty",
            "side",
            "type",
            "limit_price",
            "filled_qty",
            "status",
        ])?;
        for o in orders {
            wtr.write_record([
                o.id.to_string(),
                o.symbol.clone(),
                o.qty.to_string(),
                o.side.to_string(),
                o.order_type.name().to_string(),
                o.limit_price().map(|p| p.to_string()).unwrap_or_default(),
                o.filled_qty.to_string(),
                o.status.to_string(),
            ])?;
        }

        wtr.flush()
            .with_context(|| format!("failed to flush {}", path.display()))
    }

    /// Columns: order_id, symbol, qty, price, timestamp. Quantities are signed.
    pub fn write_fills(&self, fills: &[Fill]) -> Result<()> {
        let path = &self.paths.fills;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        wtr.write_record(["order_id", "symbol", "qty", "price", "timestamp"])?;
        for f in fills {
            wtr.write_record([
                f.order_id.to_string(),
                f.symbol.clone(),
                f.qty.to_string(),
                f.price.to_string(),
                f.timestamp.to_rfc3339(),
            ])?;
        }

        wtr.flush()
            .with_context(|| format!("failed to flush {}", path.display()))
    }

    pub fn write_stats(&self, stats: &BTreeMap<String, f64>) -> Result<()> {
        write_json(&self.paths.stats, stats)
    }

    pub fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        write_json(&self.paths.manifest, manifest)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a manifest, rejecting schema versions newer than this build.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    if manifest.schema_version > SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ticksim_core::{OrderId, OrderSide, OrderStatus};

    #[test]
    fn new_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        let writer = ArtifactWriter::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.paths().stats, dir.join(STATS_FILE));
    }

    #[test]
    fn orders_csv_has_empty_limit_for_market() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(tmp.path()).unwrap();
        let mut limit = Order::limit("L1", "AAA", OrderSide::Sell, 3.0, 101.5);
        limit.status = OrderStatus::Cancelled;
        writer
            .write_orders(&[Order::market("M1", "AAA", OrderSide::Buy, 2.0), limit])
            .unwrap();

        let text = std::fs::read_to_string(tmp.path().join(ORDERS_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,symbol,qty,side,type,limit_price,filled_qty,status");
        assert_eq!(lines[1], "M1,AAA,2,buy,market,,0,open");
        assert_eq!(lines[2], "L1,AAA,3,sell,limit,101.5,0,cancelled");
    }

    #[test]
    fn fills_csv_uses_rfc3339() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(tmp.path()).unwrap();
        let fill = Fill {
            order_id: OrderId::new("o1"),
            symbol: "AAA".into(),
            qty: -4.0,
            price: 99.25,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
        };
        writer.write_fills(&[fill]).unwrap();

        let text = std::fs::read_to_string(tmp.path().join(FILLS_FILE)).unwrap();
        assert_eq!(
            text,
            "order_id,symbol,qty,price,timestamp\no1,AAA,-4,99.25,2024-01-02T09:30:00+00:00\n"
        );
    }

    #[test]
    fn manifest_round_trips_and_rejects_future_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(tmp.path()).unwrap();
        let manifest = Manifest::new(None, vec!["AAA".into()]);
        writer.write_manifest(&manifest).unwrap();
        assert_eq!(read_manifest(&writer.paths().manifest).unwrap(), manifest);

        let future = Manifest {
            schema_version: SCHEMA_VERSION + 1,
            ..manifest
        };
        writer.write_manifest(&future).unwrap();
        assert!(read_manifest(&writer.paths().manifest).is_err());
    }
}
