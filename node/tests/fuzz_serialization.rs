//! Property-based fuzz tests for the node's trust boundaries.
//!
//! Everything a peer or a disk can hand the node (chain responses, block
//! announcements, transaction requests, snapshot files, config files) must be
//! rejected cleanly when corrupt and must never leave the local chain invalid.

use std::sync::Arc;

use proptest::prelude::*;

use poaw_ledger::{Block, ChainSnapshot, Ledger, StructuralOnly, SNAPSHOT_FILE};
use poaw_messages::{BlockAnnouncement, ChainResponse, NewTransaction};
use poaw_node::{Node, NodeConfig};
use poaw_nullables::{NullOracle, NullPeerClient};
use poaw_types::{Timestamp, Transaction, WorkPayload};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_tx() -> impl Strategy<Value = Transaction> {
    ("[a-z]{1,10}", "[a-z]{1,10}", 0.0f64..1.0e12, 0u64..=u32::MAX as u64)
        .prop_map(|(s, r, amount, ts)| Transaction::new(s, r, amount, Timestamp::new(ts)))
}

fn arb_work() -> impl Strategy<Value = Option<(WorkPayload, WorkPayload)>> {
    prop::option::of((
        prop::collection::vec(any::<u8>(), 0..48).prop_map(WorkPayload::new),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(WorkPayload::new),
    ))
}

/// A valid chain built from arbitrary block bodies.
fn arb_chain() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec((prop::collection::vec(arb_tx(), 0..4), arb_work()), 0..6).prop_map(
        |bodies| {
            let mut ledger = Ledger::with_genesis();
            for (i, (txs, work)) in bodies.into_iter().enumerate() {
                let head = ledger.head().unwrap().clone();
                let (task, solution) = work.map_or((None, None), |(t, s)| (Some(t), Some(s)));
                let block = Block::new(
                    head.index + 1,
                    Timestamp::new(i as u64 + 1),
                    txs,
                    head.hash,
                    task,
                    solution,
                    "fuzz",
                );
                ledger.append(block).unwrap();
            }
            ledger.blocks().to_vec()
        },
    )
}

fn null_node(config: NodeConfig) -> Node {
    Node::with_parts(
        config,
        Arc::new(NullOracle::accepting()),
        Arc::new(NullPeerClient::new()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Wire roundtrips
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fuzz_chain_response_roundtrip(chain in arb_chain()) {
        let response = ChainResponse::new(chain);
        let json = serde_json::to_vec(&response).unwrap();
        let decoded: ChainResponse = serde_json::from_slice(&json).unwrap();
        prop_assert!(decoded.is_consistent());
        prop_assert!(Ledger::validate(&decoded.chain, &StructuralOnly));
        prop_assert_eq!(decoded, response);
    }

    #[test]
    fn fuzz_announcement_roundtrip(chain in arb_chain(), origin in prop::option::of("[a-z]{1,8}:[1-9][0-9]{0,3}")) {
        let announcement = BlockAnnouncement {
            block: chain.last().unwrap().clone(),
            origin,
        };
        let json = serde_json::to_string(&announcement).unwrap();
        let decoded: BlockAnnouncement = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded.block.compute_hash(), announcement.block.hash);
        prop_assert_eq!(decoded, announcement);
    }
}

// ---------------------------------------------------------------------------
// Corrupt input never panics
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn fuzz_corrupt_chain_response_rejected(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = serde_json::from_slice::<ChainResponse>(&data);
    }

    #[test]
    fn fuzz_corrupt_announcement_rejected(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = serde_json::from_slice::<BlockAnnouncement>(&data);
    }

    #[test]
    fn fuzz_corrupt_transaction_request_rejected(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = serde_json::from_slice::<NewTransaction>(&data);
    }

    #[test]
    fn fuzz_corrupt_config_rejected(text in "\\PC{0,256}") {
        let _ = NodeConfig::from_toml_str(&text);
    }

    #[test]
    fn fuzz_hash_flip_is_detected(chain in arb_chain(), byte in any::<prop::sample::Index>()) {
        let mut json = serde_json::to_value(ChainResponse::new(chain.clone())).unwrap();
        let last = chain.len() - 1;
        let hash = json["chain"][last]["hash"].as_str().unwrap().to_string();
        let pos = byte.index(hash.len());
        let flipped: String = hash
            .char_indices()
            .map(|(i, c)| if i == pos { if c == '0' { '1' } else { '0' } } else { c })
            .collect();
        json["chain"][last]["hash"] = serde_json::Value::String(flipped);

        let decoded: ChainResponse = serde_json::from_value(json).unwrap();
        prop_assert!(!Ledger::validate(&decoded.chain, &StructuralOnly));
    }
}

// ---------------------------------------------------------------------------
// Node-level boundaries
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever block a peer pushes, the local chain stays valid.
    #[test]
    fn fuzz_announced_blocks_keep_chain_valid(chain in arb_chain(), tamper in any::<bool>()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let node = null_node(NodeConfig::default());
            for block in chain.iter().skip(1) {
                let mut block = block.clone();
                if tamper {
                    block.producer.push('!');
                }
                let resp = node
                    .receive_block(BlockAnnouncement { block, origin: None })
                    .await
                    .unwrap();
                assert_eq!(resp.accepted, !tamper);
            }
            let local = node.chain().await.chain;
            assert!(node.engine().validate(&local));
            let expected = if tamper { 1 } else { chain.len() };
            assert_eq!(local.len(), expected);
        });
    }

    /// A snapshot file full of garbage is ignored and the node starts at genesis.
    #[test]
    fn fuzz_corrupt_snapshot_falls_back_to_genesis(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE), &data).unwrap();
        prop_assert!(ChainSnapshot::load(dir.path()).is_err());

        let rt = tokio::runtime::Runtime::new().unwrap();
        let length = rt.block_on(async {
            let node = null_node(NodeConfig {
                data_dir: Some(dir.path().to_path_buf()),
                ..NodeConfig::default()
            });
            node.chain().await.length
        });
        prop_assert_eq!(length, 1);
    }
}
