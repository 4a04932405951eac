use hybrid_containers::*;

fn main() {
    let mut vec = hybrid_vec!(4;
        "1".to_owned(),
        "2".to_owned(),
        "3".to_owned(),
        "4".to_owned());
    println!("{vec:?} inline={}", vec.is_inline());

    vec.push("5".to_owned());
    println!("{vec:?} inline={} capacity={}", vec.is_inline(), vec.capacity());

    vec.erase(0);
    vec.shrink_to_fit();
    println!("{vec:?} inline={} capacity={}", vec.is_inline(), vec.capacity());
}
