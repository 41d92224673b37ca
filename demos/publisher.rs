//! A simple publisher example.
//!
//! In this example, there are three threads:
//! -   Two Producer threads will intermittently append a new item to the GrowableArray.
//! -   A Consumer thread will intermittently look at the GrowableArray.
//!
//! Each time the Consumer thread looks at the GrowableArray, it prints the new items that were not present the
//! previous time it looked.

extern crate crossbeam_utils;
extern crate growable;

use std::{thread, time};

use growable::array::GrowableArray;

fn main() {
    const NUMBER_PRODUCERS: usize = 2;
    const NUMBER_ELEMENTS: usize = 10;
    const PACE_TIME: time::Duration = time::Duration::from_millis(50);

    let array: GrowableArray<_> = GrowableArray::new();

    crossbeam_utils::thread::scope(|scope| {
        //  Consumer
        scope.spawn(|_| {
            let mut seen = 0;

            while seen < NUMBER_PRODUCERS * NUMBER_ELEMENTS {
                let guard = array.guard();

                for (i, item) in array.iter(&guard).enumerate().skip(seen) {
                    println!("Consumer saw new item {}: {}", i, item);
                    seen = i + 1;
                }

                thread::sleep(PACE_TIME);
            }

            println!("Consumer final array: {:?}", array);

            assert_eq!(NUMBER_PRODUCERS * NUMBER_ELEMENTS, array.len());
        });

        //  Producers
        for p in 0..NUMBER_PRODUCERS {
            let array = &array;

            scope.spawn(move |_| {
                for i in 0..NUMBER_ELEMENTS {
                    let value = format!("{}th value of producer {}", i, p);
                    let index = array.try_push(value).unwrap();

                    println!("Producer {} pushed item {}", p, index);

                    thread::sleep(PACE_TIME);
                }
            });
        }
    }).unwrap();
}
