//! Integrationstests für den Open-Rails-Writer: komplette Routen in ein
//! temporäres Verzeichnis schreiben und die STF-Dateien zurücklesen.

use std::path::{Path as FsPath, PathBuf};

use or_route_builder::{
    find_shortest_path, EdgeSegment, End, Graph, LineEnding, Path, Pose, RouteError, RoutePlan,
    RouteWriter, SceneryKind, SceneryObject, Vector, WriterOptions,
};

fn temp_route(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("or_route_builder_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn lf_options() -> WriterOptions {
    WriterOptions {
        line_ending: LineEnding::Lf,
        ..WriterOptions::default()
    }
}

/// Liest eine UTF-16LE-Datei mit BOM.
fn read_stf(path: &FsPath) -> String {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    assert_eq!(&bytes[..2], &[0xFF, 0xFE], "BOM fehlt in {}", path.display());
    let units: Vec<u16> = bytes[2..]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).expect("gültiges UTF-16")
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

#[test]
fn switch_route_writes_complete_file_set() {
    let plan = RoutePlan::from_toml_str(include_str!("../demos/switch.toml")).expect("Plan");
    let route = plan.build().expect("baubar");
    let dir = temp_route("switch");

    let writer = RouteWriter::new(&dir, &route.graph, lf_options()).expect("Writer");
    writer.write_all().expect("Route geschrieben");
    for request in &route.paths {
        writer
            .write_path_file(
                &request.file,
                &request.name,
                &request.start_name,
                &request.end_name,
                &request.path,
            )
            .expect("Pfad geschrieben");
    }

    let trk = read_stf(&dir.join("or_route_builder_switch.trk"));
    assert!(trk.starts_with("SIMISA@@@@@@@@@@JINX0r1t______\n\n"));
    assert!(trk.contains("RouteStart ( -5354 14849 0 0 )"));

    let tdb = read_stf(&dir.join("or_route_builder_switch.tdb"));
    assert!(tdb.starts_with("SIMISA@@@@@@@@@@JINX0T0t______"));
    // 4 Knoten + 3 Kanten
    assert!(tdb.contains("TrackNodes ( 7"));
    assert_eq!(tdb.matches("TrJunctionNode").count(), 1);
    assert_eq!(tdb.matches("TrEndNode").count(), 3);
    assert!(!tdb.contains("TrItemTable"));

    let tsection = read_stf(&dir.join("tsection.dat"));
    // 1 + 1 + 4 Segmente
    assert!(tsection.contains("TrackSections ( 12"));
    assert!(tsection.contains("SectionIdx ( 6"));
    assert!(tsection.contains("TrackPath ( 40000 1 40000 )"));

    let world_files = std::fs::read_dir(dir.join("world")).expect("world/").count();
    assert_eq!(world_files, writer.world().len());
    let origin_world = read_stf(&writer.world_file_name(writer.origin_tile()));
    assert_eq!(origin_world.matches("Dyntrack (").count(), 6);

    let main = read_stf(&dir.join("paths").join("0.pat"));
    let main_lines = lines(&main);
    // Zwischenpunkte (`2 0`) stehen vor den Knotenpunkten
    assert!(main_lines.contains(&"TrackPDP ( -5354 14849 -700.0 1.0 0.0 2 0 )"));
    assert!(main_lines.contains(&"TrackPDP ( -5354 14849 -1000.0 1.0 0.0 1 1 )"));
    assert!(main_lines.contains(&"TrPathNodes ( 3"));
    assert!(main_lines.contains(&"TrPathNode ( 00000000 1 4294967295 1 )"));
    assert!(main_lines.contains(&"TrPathNode ( 00000000 2 4294967295 0 )"));
    assert!(main_lines.contains(&"TrPathNode ( 00000000 4294967295 4294967295 2 )"));
    assert!(dir.join("paths").join("2.pat").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn signal_gets_track_item_in_tdb_and_world() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    let end = graph.add_edge_at_node(start, 1200.0, 0.0, false);
    graph.attach_to_edge(
        end.edge,
        SceneryObject::new(Pose::at(Vector::new(100.0, -3.0)), SceneryKind::Signal)
            .with_shapefile("Signal.s"),
    );
    let dir = temp_route("signal");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    writer.write_all().expect("Route geschrieben");

    let tdb = read_stf(&dir.join("or_route_builder_signal.tdb"));
    let tdb_lines = lines(&tdb);
    assert!(tdb_lines.contains(&"TrItemRefs ( 1"));
    assert!(tdb_lines.contains(&"TrItemRef ( 0 )"));
    assert!(tdb_lines.contains(&"TrItemTable ( 1"));
    assert!(tdb_lines.contains(&"TrItemSData ( 100.0 00000002 )"));
    assert!(tdb_lines.contains(&"TrItemRData ( 100.0 1.0 0.0 -5354 14849)"));
    assert!(tdb_lines.contains(&"TrSignalType ( 00000000 1 1.8310872 Ks )"));

    let world = read_stf(&writer.world_file_name(writer.origin_tile()));
    assert!(world.contains("TrItemId ( 0 0 )"));
    assert!(world.contains("FileName ( Signal.s )"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn static_object_without_shapefile_is_skipped() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    graph.add_edge_at_node(start, 100.0, 0.0, false);
    graph.attach_to_graph(SceneryObject::new(
        Pose::at(Vector::new(50.0, 10.0)),
        SceneryKind::Static,
    ));
    let dir = temp_route("skip_static");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    writer.write_all().expect("Route geschrieben");

    let world = read_stf(&writer.world_file_name(writer.origin_tile()));
    assert!(!world.contains("Static ("));
    assert_eq!(world.matches("Dyntrack (").count(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn signal_on_graph_is_topology_error() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    graph.add_edge_at_node(start, 100.0, 0.0, false);
    graph.attach_to_graph(
        SceneryObject::new(Pose::at(Vector::new(50.0, 3.0)), SceneryKind::Signal)
            .with_shapefile("Signal.s"),
    );

    let result = RouteWriter::new(temp_route("graph_signal"), &graph, lf_options());
    assert!(matches!(result, Err(RouteError::Topology(_))));
}

#[test]
fn passthrough_node_aborts_tdb() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    let first = graph.add_edge_at_node(start, 100.0, 0.0, false);
    graph
        .add_edge_at_end(first, 100.0, 0.0, false)
        .expect("zweite Kante");
    let dir = temp_route("passthrough");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    let error = writer.write_all().expect_err("Grad 2 ist unzulässig");

    assert!(matches!(
        error.downcast_ref::<RouteError>(),
        Some(RouteError::Topology(_))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_path_is_rejected() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    graph.add_edge_at_node(start, 100.0, 0.0, false);
    let dir = temp_route("empty_path");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    let error = writer
        .write_path_file("0", "leer", "a", "b", &Default::default())
        .expect_err("leerer Pfad");

    assert!(matches!(
        error.downcast_ref::<RouteError>(),
        Some(RouteError::EmptyPath)
    ));
}

#[test]
fn parallel_edge_gets_midpoint_waypoint() {
    let mut graph = Graph::new();
    let a = graph.add_node(Pose::at(Vector::ZERO));
    let b = graph.add_node(Pose::new(Vector::new(100.0, 0.0), std::f64::consts::PI));
    let straight = EdgeSegment::straight(Pose::at(Vector::ZERO), 100.0);
    let first = graph.insert_edge(a, b, vec![straight]);
    graph.insert_edge(a, b, vec![straight]);
    let dir = temp_route("parallel_path");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    writer
        .write_path_file("0", "parallel", "a", "b", &Path::new(vec![End::source(first)]))
        .expect("Pfad geschrieben");

    let pat = read_stf(&dir.join("paths").join("0.pat"));
    let pat_lines = lines(&pat);
    assert!(pat_lines.contains(&"TrackPDP ( -5354 14849 50.0 1.0 0.0 1 1 )"));
    assert!(pat_lines.contains(&"TrPathNodes ( 3"));
    assert!(pat_lines.contains(&"TrPathNode ( 00000000 1 4294967295 0 )"));
    assert!(pat_lines.contains(&"TrPathNode ( 00000004 2 4294967295 1 )"));
    assert!(pat_lines.contains(&"TrPathNode ( 00000000 4294967295 4294967295 2 )"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn start_offset_skips_whole_edges() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    let first = graph.add_edge_at_node(start, 100.0, 0.0, false);
    let second = graph
        .add_edge_at_end(first, 100.0, 0.0, false)
        .expect("zweite Kante");
    let path = find_shortest_path(&graph, start, graph.end_node(second)).with_offsets(150.0, 0.0);
    assert_eq!(path.len(), 2);
    let dir = temp_route("offset_path");

    let writer = RouteWriter::new(&dir, &graph, lf_options()).expect("Writer");
    writer
        .write_path_file("0", "versetzt", "a", "b", &path)
        .expect("Pfad geschrieben");

    let pat = read_stf(&dir.join("paths").join("0.pat"));
    let pat_lines = lines(&pat);
    assert!(pat_lines.contains(&"TrPathNodes ( 2"));
    assert!(pat_lines.contains(&"TrackPDP ( -5354 14849 150.0 1.0 0.0 1 1 )"));
    assert!(pat_lines.contains(&"TrackPDP ( -5354 14849 200.0 1.0 0.0 1 1 )"));
    assert!(!pat.contains("TrackPDP ( -5354 14849 0.0 "));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn crlf_is_the_default_line_ending() {
    let mut graph = Graph::new();
    let start = graph.add_node(Pose::at(Vector::ZERO));
    graph.add_edge_at_node(start, 100.0, 0.0, false);
    let dir = temp_route("crlf");

    let writer = RouteWriter::new(&dir, &graph, WriterOptions::default()).expect("Writer");
    std::fs::create_dir_all(&dir).expect("Verzeichnis");
    writer.write_tsection_file().expect("tsection.dat");

    let text = read_stf(&dir.join("tsection.dat"));
    assert!(text.starts_with("SIMISA@@@@@@@@@@JINX0T0t______\r\n\r\n"));
    assert!(!text.replace("\r\n", "").contains('\n'));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn graph_json_export_is_optional() {
    let plan = RoutePlan::from_toml_str(include_str!("../demos/tree.toml")).expect("Plan");
    let route = plan.build().expect("baubar");
    let dir = temp_route("tree_json");
    let options = WriterOptions {
        export_graph_json: true,
        ..lf_options()
    };

    let writer = RouteWriter::new(&dir, &route.graph, options).expect("Writer");
    writer.write_all().expect("Route geschrieben");

    let json = std::fs::read_to_string(dir.join("or_route_builder_tree_json.graph.json"))
        .expect("Graph-Export");
    assert!(json.contains("tree.s"));
    let world = read_stf(&writer.world_file_name(writer.origin_tile()));
    assert!(world.contains("FileName ( tree.s )"));
    assert!(world.contains("StaticFlags (    90000 )"));

    let _ = std::fs::remove_dir_all(&dir);
}
