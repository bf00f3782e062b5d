/*!
# ferroservo-interface

Interface definition between the servo loop and its clients.

Data is passed from the loop to a client by invoking [Read::read] on the client.

Data is passed from the client to the loop by invoking [Write::write] on the client.

The client state is updated by invoking [Update::update] on the client,
always in the order [Read], [Update], [Write] within a control cycle.
*/

use std::any::type_name;

mod data;
pub use data::Data;
pub use ferroservo_uid_derive::UID;

/// Defines the data type associated with unique identifier data type
pub trait UniqueIdentifier: Send + Sync {
    type DataType: Send + Sync;
}
impl UniqueIdentifier for () {
    type DataType = ();
}

/// Client state update interface
pub trait Update: Send + Sync {
    fn update(&mut self) {}
}
/// Client input data reader interface
pub trait Read<U: UniqueIdentifier>: Update {
    /// Read data from an input
    fn read(&mut self, data: Data<U>);
}
/// Client output data writer interface
pub trait Write<U: UniqueIdentifier>: Update {
    fn write(&mut self) -> Option<Data<U>>;
}

use log::{info, warn};

/// Pretty prints error message
///
/// The error is followed by the chain of its sources, one per line.
pub fn print_info<S: Into<String>>(msg: S, e: Option<&dyn std::error::Error>) {
    if let Some(e) = e {
        let mut msg: Vec<String> = vec![msg.into()];
        msg.push(format!("{}", e));
        let mut current = e.source();
        while let Some(cause) = current {
            msg.push(format!("{}", cause));
            current = cause.source();
        }
        warn!("{}", msg.join("\n .due to: "))
    } else {
        info!("{}", msg.into())
    }
}

/// Returns the type name of `T` stripped of its module path
pub fn trim_type_name<T>() -> String {
    fn trim(name: &str) -> String {
        if let Some((prefix, suffix)) = name.split_once('<') {
            let generics: Vec<_> = suffix.split(',').map(|s| trim(s)).collect();
            format!("{}<{}", trim(prefix), generics.join(","))
        } else {
            if let Some((_, suffix)) = name.rsplit_once("::") {
                suffix.into()
            } else {
                name.into()
            }
        }
    }
    trim(type_name::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    pub enum Gain {}
    impl UniqueIdentifier for Gain {
        type DataType = f64;
    }

    #[derive(Default)]
    struct Doubler {
        u: f64,
        y: f64,
    }
    impl Update for Doubler {
        fn update(&mut self) {
            self.y = 2. * self.u;
        }
    }
    impl Read<Gain> for Doubler {
        fn read(&mut self, data: Data<Gain>) {
            self.u = *data;
        }
    }
    impl Write<Gain> for Doubler {
        fn write(&mut self) -> Option<Data<Gain>> {
            Some(Data::new(self.y))
        }
    }

    #[test]
    fn read_update_write() {
        let mut client = Doubler::default();
        <Doubler as Read<Gain>>::read(&mut client, Data::new(1.5));
        client.update();
        let y = <Doubler as Write<Gain>>::write(&mut client).map(|data| *data);
        assert_eq!(y, Some(3.));
    }

    #[test]
    fn trimmed_names() {
        assert_eq!(trim_type_name::<Doubler>(), "Doubler");
        assert_eq!(trim_type_name::<Data<Gain>>(), "Data<Gain>");
    }
}
