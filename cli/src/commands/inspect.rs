use std::collections::BTreeSet;

use anyhow::Result;
use shortburst::{Adjacency, PrecinctGraph};

use crate::cli::{Cli, InspectArgs};

pub fn run(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let adjacency = if args.queen { Adjacency::Queen } else { Adjacency::Rook };
    let graph = PrecinctGraph::from_file(&args.input, adjacency)?;

    println!("precincts: {}", graph.node_count());
    println!("adjacencies: {}", graph.edge_count());
    println!("columns: {}", graph.columns().join(", "));

    match graph.total(&args.pop_col) {
        Ok(total) => println!("total {}: {total}", args.pop_col),
        Err(err) => println!("total {}: unavailable ({err})", args.pop_col),
    }

    let labels = (0..graph.node_count())
        .filter_map(|node| graph.attribute(node, &args.district_col))
        .filter(|value| !value.is_null())
        .map(|value| value.to_string())
        .collect::<BTreeSet<_>>();
    let unlabeled = (0..graph.node_count())
        .filter(|&node| graph.attribute(node, &args.district_col).is_none_or(|value| value.is_null()))
        .count();
    println!("districts in '{}': {} ({unlabeled} precincts unlabeled)", args.district_col, labels.len());

    let isolated = (0..graph.node_count()).filter(|&node| graph.neighbors(node).is_empty()).count();
    if isolated > 0 { println!("isolated precincts: {isolated}") }

    if cli.verbose > 0 {
        for node in (0..graph.node_count()).filter(|&node| graph.neighbors(node).is_empty()) {
            println!("  isolated: node {node}");
        }
    }

    Ok(())
}
