//! End-to-end walk through append, insert, and erase on an integer
//! container, checking sizes and element values after each step.

use stave_seq::Stave;

#[test]
fn append_insert_erase_walkthrough() {
    // Append 0..=9.
    let mut s: Stave<i32> = Stave::new();
    for v in 0..10 {
        s.push(v).unwrap();
    }
    assert_eq!(s.len(), 10);
    assert_eq!(*s.at(0).unwrap(), 0);
    assert_eq!(*s.at(9).unwrap(), 9);

    // Insert 99 at index 5.
    s.insert(5, 99).unwrap();
    assert_eq!(s.len(), 11);
    assert_eq!(*s.at(5).unwrap(), 99);
    assert_eq!(*s.at(6).unwrap(), 5);
    assert_eq!(*s.at(4).unwrap(), 4);
    assert_eq!(*s.back().unwrap(), 9);

    // Erase the front.
    assert_eq!(s.erase(0).unwrap(), 0);
    assert_eq!(s.len(), 10);
    assert_eq!(*s.at(0).unwrap(), 1);
    assert_eq!(*s.at(4).unwrap(), 99);
    assert_eq!(s, [1, 2, 3, 4, 99, 5, 6, 7, 8, 9]);
}

#[test]
fn stack_usage() {
    let mut s: Stave<&str> = Stave::new();
    s.push("a").unwrap();
    s.push("b").unwrap();
    assert_eq!(*s.top().unwrap(), "b");
    assert_eq!(s.pop().unwrap(), "b");
    assert_eq!(s.pop().unwrap(), "a");
    assert!(s.pop().is_err());
}

#[test]
fn owned_iteration_round_trips() {
    let s = Stave::from_slice(&[String::from("x"), String::from("y")]).unwrap();
    let collected: Vec<String> = s.into_iter().collect();
    assert_eq!(collected, ["x", "y"]);
}

#[test]
fn works_as_a_slice() {
    let mut s = Stave::from_slice(&[3, 1, 2]).unwrap();
    s.sort_unstable();
    assert_eq!(&s[..], &[1, 2, 3]);
    assert_eq!(s.iter().sum::<i32>(), 6);
    for v in &mut s {
        *v *= 10;
    }
    assert_eq!(s, [10, 20, 30]);
}
