//! Custody command

use std::fmt::Write as _;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use itertools::Itertools;
use peerdas_engine::{
    custody::can_self_reconstruct, custody_info::CustodyInfo, peer_info::PeerInfo,
};
use peerdas_types::{NodeId, spec::DasSpec};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct CustodyCmd {
    /// Node id as 32 hex bytes (default: `node.node_id` from the configuration)
    #[clap(long)]
    pub node_id: Option<NodeId>,

    /// Custody group count (default: the node's target count)
    #[clap(long)]
    pub count: Option<u64>,

    /// Print JSON instead of plain text
    #[clap(long)]
    pub json: bool,
}

/// Custody assignment of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyReport {
    pub node_id: NodeId,
    pub custody_group_count: u64,
    pub custody_groups: Vec<u64>,
    pub custody_columns: Vec<u64>,
    pub data_column_subnets: Vec<u64>,
    pub can_self_reconstruct: bool,
}

impl CustodyCmd {
    pub fn run(&self, config: &Config) -> Result<CustodyReport> {
        let spec: &DasSpec = &config.das;
        spec.validate()?;

        let node_id = self
            .node_id
            .or(config.node.node_id)
            .ok_or_else(|| eyre!("No node id given, pass --node-id or set node.node_id"))?;

        let count = match self.count {
            Some(count) => count,
            None => CustodyInfo::new(config.node.subscribe_all_subnets).target_group_count(spec),
        };

        debug!(%node_id, count, "Computing custody assignment");
        let info = PeerInfo::compute(node_id, count, spec)?;

        Ok(CustodyReport {
            node_id,
            custody_group_count: count,
            custody_groups: info.custody_groups.into_iter().collect(),
            custody_columns: info.custody_columns.into_iter().collect(),
            data_column_subnets: info.data_column_subnets.into_iter().collect(),
            can_self_reconstruct: can_self_reconstruct(count, spec),
        })
    }
}

impl CustodyReport {
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }

        let mut out = String::new();
        writeln!(out, "node id:              {}", self.node_id)?;
        writeln!(out, "custody group count:  {}", self.custody_group_count)?;
        writeln!(out, "custody groups:       {}", self.custody_groups.iter().join(", "))?;
        writeln!(out, "custody columns:      {}", self.custody_columns.iter().join(", "))?;
        writeln!(out, "data column subnets:  {}", self.data_column_subnets.iter().join(", "))?;
        write!(out, "can self reconstruct: {}", self.can_self_reconstruct)?;
        Ok(out)
    }
}
