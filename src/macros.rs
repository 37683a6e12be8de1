/// Invokes a [`Channel`] with loosely typed arguments.
///
/// Each argument is converted through `Into<Arg>`, so primitives, strings,
/// and [`serde_json::Value`]s mix freely:
///
/// ```
/// use dbug::dbug;
///
/// let chan = dbug::channel("server:http");
/// dbug!(chan, "listening on %s:%d", "0.0.0.0", 8080);
/// dbug!(chan, "config %O", serde_json::json!({ "pool": 4 }));
/// ```
///
/// [`Channel`]: crate::Channel
#[macro_export]
macro_rules! dbug {
    ($channel:expr, $first:expr $(, $arg:expr)* $(,)?) => {
        $channel.log($crate::Arg::from($first), &[$($crate::Arg::from($arg)),*])
    };
}
