use light_roulette::core::grid::{GridDims, GridTopology};

#[test]
fn adjacency_is_symmetric_for_every_grid() {
    for count in 1..=80 {
        let topo = GridTopology::build(count).expect("non-empty grid");
        for i in 0..count {
            for &j in topo.neighbors(i).iter() {
                assert!(
                    topo.neighbors(j).contains(&i),
                    "count={count}: {j} is next to {i} but not the reverse"
                );
            }
        }
    }
}

#[test]
fn neighbors_stay_inside_the_roster() {
    for count in 1..=80 {
        let topo = GridTopology::build(count).expect("non-empty grid");
        for i in 0..count {
            let neighbors = topo.neighbors(i);
            assert!(neighbors.len() <= 8);
            assert!(neighbors.iter().all(|&j| j < count && j != i));
        }
    }
}

#[test]
fn neighbors_never_wrap_across_edges() {
    let topo = GridTopology::build(16).unwrap();
    let cols = topo.dims().cols;
    for i in 0..16 {
        let (r, c) = topo.row_col(i);
        for &j in topo.neighbors(i).iter() {
            let (rj, cj) = topo.row_col(j);
            assert!(r.abs_diff(rj) <= 1 && c.abs_diff(cj) <= 1);
            assert!(cj < cols);
        }
    }
}

#[test]
fn single_entry_is_an_isolated_cell() {
    let topo = GridTopology::build(1).unwrap();
    assert_eq!(topo.dims(), GridDims { rows: 1, cols: 1 });
    assert!(topo.neighbors(0).is_empty());
}

#[test]
fn three_entries_leave_one_empty_slot() {
    let topo = GridTopology::build(3).unwrap();
    assert_eq!(topo.dims(), GridDims { rows: 2, cols: 2 });
    assert_eq!(topo.row_col(2), (1, 0));
    assert_eq!(topo.empty_slots(), 1);
    let mut n: Vec<usize> = topo.neighbors(2).to_vec();
    n.sort_unstable();
    assert_eq!(n, vec![0, 1]);
}

#[test]
fn zero_entries_build_nothing() {
    assert!(GridTopology::build(0).is_none());
    assert!(GridDims::for_count(0).is_none());
}
