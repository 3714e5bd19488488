use seesaw::{Network, TreeMap};

fn main() {
    let mut map = TreeMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "two again");
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&2), Ok(&"two again"));

    map.remove(&1).unwrap();
    assert!(map.get(&1).is_err());

    println!("height {}, balanced at root: {}", map.height(), map.is_balanced());
    for (k, v) in &map {
        println!("{k} => {v}");
    }

    print!("keys in order: ");
    for k in map.keys() {
        print!("{k} ");
    }
    println!();

    let matrix = vec![
        vec![false, true, true, false, false],
        vec![true, false, false, true, true],
        vec![true, false, false, false, false],
        vec![false, true, false, false, false],
        vec![false, true, false, false, false],
    ];
    let mut graph: Network<usize, Option<u32>> = Network::from_matrix(&matrix);
    graph.set(&4, Some(7)).unwrap();
    println!("node 4 carries {:?}", graph.get(&4).unwrap());
}
