mod pool;

#[cfg(test)]
pub use pool::create_lazy_pool;
pub use pool::create_pool;
