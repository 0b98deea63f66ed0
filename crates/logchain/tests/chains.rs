use logchain::{
    ChainError, FileConfig, FileTransport, LoggingEvent, MemoryConfig, MemoryTransport, Node,
    SinkConfig, TransportOptions,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Graph {
    root1: Node,
    root2: Node,
    child: Node,
    _dir: TempDir,
    child_log: std::path::PathBuf,
    root2_log: std::path::PathBuf,
}

/// root1 accepts errors only, root2 accepts info and has an error-level
/// file, child is created under root1 and writes everything to a file.
fn setup() -> Graph {
    let dir = TempDir::new().unwrap();
    let child_log = dir.path().join("child.log");
    let root2_log = dir.path().join("root2.log");

    let root1 = Node::new("root1", &SinkConfig::default().with_memory(MemoryConfig::at_level("error"))).unwrap();

    let root2 = Node::new("root2", &SinkConfig::default().with_memory(MemoryConfig::default())).unwrap();
    let file = FileTransport::new(FileConfig::new(root2_log.to_string_lossy().to_string())).unwrap();
    root2.use_transport(Box::new(file), TransportOptions::level("error")).unwrap();

    let child_config = SinkConfig::default()
        .with_level("debug")
        .with_file(FileConfig::new(child_log.to_string_lossy().to_string()));
    let child = root1.new_child("child", &child_config).unwrap();

    Graph {
        root1,
        root2,
        child,
        _dir: dir,
        child_log,
        root2_log,
    }
}

fn capture(node: &Node) -> Arc<Mutex<Vec<LoggingEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    node.subscribe(Arc::new(move |event: &LoggingEvent| {
        sink.lock().unwrap().push(event.clone());
    }));
    events
}

fn lines(path: &std::path::Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_no_circular_chains() {
    let g = setup();
    assert_eq!(g.child.attached().len(), 1);

    g.child.attach(&g.root2);
    assert_eq!(g.child.attached().len(), 2);

    g.root2.attach(&g.child);
    assert_eq!(g.root2.attached().len(), 0);
}

#[test]
fn test_child_is_constructed_attached_to_parent() {
    let g = setup();
    let attached = g.child.attached();
    assert_eq!(attached.len(), 1);
    assert!(attached[0].ptr_eq(&g.root1));
    assert!(g.root1.attached().is_empty());
}

#[test]
fn test_info_from_child_reaches_root2() {
    let g = setup();
    g.child.attach(&g.root2);
    let root2_events = capture(&g.root2);

    g.child.info("Child log info").unwrap();

    let events = root2_events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tag, "root2");
    assert_eq!(events[0].level, "info");
    assert_eq!(events[0].message, "Child log info");
}

#[test]
fn test_info_from_child_is_filtered_by_root1() {
    let g = setup();
    g.child.attach(&g.root2);
    let root1_events = capture(&g.root1);

    g.child.info("Child log info").unwrap();
    assert!(root1_events.lock().unwrap().is_empty());
}

#[test]
fn test_error_from_child_reaches_both_roots() {
    let g = setup();
    g.child.attach(&g.root2);
    let root1_events = capture(&g.root1);
    let root2_events = capture(&g.root2);

    g.child.error("Child log error").unwrap();

    let root1_events = root1_events.lock().unwrap();
    assert_eq!(root1_events.len(), 1);
    assert_eq!(root1_events[0].level, "error");
    assert_eq!(root1_events[0].message, "Child log error");

    // memory and file transports both accept the error
    let transports: Vec<String> = root2_events
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.transport.clone())
        .collect();
    assert_eq!(transports, vec!["memory", "file"]);
}

#[test]
fn test_roots_do_not_cascade_to_child() {
    let g = setup();
    g.child.attach(&g.root2);
    let child_events = capture(&g.child);

    g.root2.error("Root log error").unwrap();
    g.root1.error("Root log error").unwrap();

    assert!(child_events.lock().unwrap().is_empty());
}

#[test]
fn test_files_receive_their_levels() {
    let g = setup();
    g.child.attach(&g.root2);

    g.child.debug("details").unwrap();
    g.child.error("failure").unwrap();
    g.child.flush().unwrap();
    g.root2.flush().unwrap();

    let child_lines = lines(&g.child_log);
    assert_eq!(child_lines.len(), 2);
    assert_eq!(child_lines[0]["level"], "debug");

    let root2_lines = lines(&g.root2_log);
    assert_eq!(root2_lines.len(), 1);
    assert_eq!(root2_lines[0]["message"], "failure");
}

#[test]
fn test_once_listener() {
    let g = setup();
    let count = Arc::new(Mutex::new(0));
    let seen = Arc::clone(&count);
    g.root1.once(Arc::new(move |_: &LoggingEvent| {
        *seen.lock().unwrap() += 1;
    }));

    g.child.error("one").unwrap();
    g.child.error("two").unwrap();
    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(g.root1.listener_count(), 0);
}

#[test]
fn test_try_attach_reports_cycle() {
    let g = setup();
    g.child.attach(&g.root2);

    let err = g.root2.try_attach(&g.child).unwrap_err();
    assert!(matches!(err, ChainError::Cycle { .. }));
    assert_eq!(
        err.to_string(),
        "Attaching logger child to root2 would create an infinite loop"
    );
}

#[test]
fn test_every_attach_sequence_stays_acyclic() {
    let nodes: Vec<Node> = (0..5)
        .map(|i| Node::new(format!("n{}", i), &SinkConfig::default().with_memory(MemoryConfig::default())).unwrap())
        .collect();

    // Try every ordered pair, in an order that mixes forward and backward edges
    for step in 0..nodes.len() * nodes.len() {
        let from = &nodes[(step * 3) % nodes.len()];
        let to = &nodes[(step * 7 + 1) % nodes.len()];

        let before: Vec<Vec<String>> = nodes
            .iter()
            .map(|n| n.attached().iter().map(|a| a.tag().to_string()).collect())
            .collect();

        if from.try_attach(to).is_err() {
            let after: Vec<Vec<String>> = nodes
                .iter()
                .map(|n| n.attached().iter().map(|a| a.tag().to_string()).collect())
                .collect();
            assert_eq!(before, after);
        }
    }

    for n in &nodes {
        assert!(!n.forwards_to(n));
        for reachable in n.downstream() {
            assert!(!reachable.ptr_eq(n));
            assert!(!reachable.forwards_to(n));
        }
    }
}

#[test]
fn test_concurrent_log_and_attach() {
    let root = Node::new("root", &SinkConfig::default().with_memory(MemoryConfig::at_level("silly"))).unwrap();
    let leaves: Vec<Node> = (0..4)
        .map(|i| root.new_child(format!("leaf{}", i), &SinkConfig::default().with_memory(MemoryConfig::default())).unwrap())
        .collect();
    let root_events = capture(&root);

    std::thread::scope(|scope| {
        for leaf in &leaves {
            scope.spawn(move || {
                for i in 0..50 {
                    leaf.info(format!("message {}", i)).unwrap();
                }
            });
        }
        scope.spawn(|| {
            for (i, leaf) in leaves.iter().enumerate() {
                let next = &leaves[(i + 1) % leaves.len()];
                leaf.attach(next);
                root.attach(leaf);
            }
        });
    });

    // Every leaf call reached root at least once along its parent edge
    assert!(root_events.lock().unwrap().len() >= leaves.len() * 50);
    assert!(!root.forwards_to(&root));
}

#[test]
fn test_tree_built_top_down_forwards_to_root() {
    let root = Node::new("root", &SinkConfig::default().with_level("silly")).unwrap();
    let transport = MemoryTransport::named("capture");
    let buffer = transport.buffer();
    root.use_transport(Box::new(transport), TransportOptions::level("silly"))
        .unwrap()
        .remove("console")
        .unwrap();

    // Intermediate handles are dropped as soon as the chain is built
    let leaf = root
        .new_child("mid", &SinkConfig::default().with_memory(MemoryConfig::default()))
        .unwrap()
        .new_child("leaf", &SinkConfig::default().with_memory(MemoryConfig::default()))
        .unwrap();
    drop(root);

    leaf.warn("from the bottom").unwrap();
    assert_eq!(buffer.messages(), vec![("warn".to_string(), "from the bottom".to_string())]);

    let path: Vec<String> = leaf.downstream().iter().map(|n| n.tag().to_string()).collect();
    assert_eq!(path, vec!["mid", "root"]);
}
