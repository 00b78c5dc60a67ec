use std::sync::Arc;

use parking_lot::RwLock;

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

/// Returns the unqualified name of a type, without module path or generic
/// arguments (`my_app::model::Order<u32>` becomes `Order`).
pub fn short_type_name<T: ?Sized>() -> String {
    let full_name = std::any::type_name::<T>();
    let without_generics = match full_name.find('<') {
        Some(index) => &full_name[..index],
        None => full_name,
    };
    match without_generics.rsplit_once("::") {
        Some((_, name)) => name.to_string(),
        None => without_generics.to_string(),
    }
}
