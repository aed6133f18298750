//! `bindN`/`liftN`: the same shape as [`crate::combinators::bind`]/
//! [`crate::combinators::lift`], generalized to several input behaviors.
//! Re-running subscribes to every input again (dropping whichever
//! subscriptions the previous run made, exactly as the single-input
//! forms do), and a failure in any input short-circuits to that
//! failure in argument order without calling `f`.
//!
//! The two `macro_rules!` below generate `lift2..lift7` and
//! `bind2..bind7` from one body each; hand-duplicating seven nearly
//! identical functions per family would just be more surface for the
//! two shapes to drift apart.

use crate::{
	behavior::{read_result, subscribe_current, write, Behavior, Eq},
	error::Outcome,
};

macro_rules! lift_n {
	($name:ident, $($A:ident : $a:ident),+) => {
		#[doc = concat!("Derives a behavior from ", stringify!($($a)+), " at once: recomputes whenever any input changes.")]
		#[must_use]
		pub fn $name<$($A: Clone + 'static,)+ B: Clone + 'static>(
			$($a: &Behavior<$A>,)+
			mut f: impl FnMut($(&$A,)+) -> B + 'static,
			eq: Eq<B>,
		) -> Behavior<B> {
			let runtime = ($($a.runtime().clone(),)+).0;
			let out = Behavior::pending(runtime.clone(), eq);
			$(let $a = $a.clone();)+
			let out2 = out.clone();
			let _ = runtime.spawn_reader(move || {
				$(subscribe_current(&$a);)+
				let result: Outcome<B> = (|| {
					$(let $a = read_result(&$a)?;)+
					Ok(f($(&$a,)+))
				})();
				write(&out2, result);
			});
			out
		}
	};
}

macro_rules! bind_n {
	($name:ident, $($A:ident : $a:ident),+) => {
		#[doc = concat!("Like `bind`, over ", stringify!($($a)+), " inputs: `f` picks the behavior to track next.")]
		#[must_use]
		pub fn $name<$($A: Clone + 'static,)+ B: Clone + 'static>(
			$($a: &Behavior<$A>,)+
			mut f: impl FnMut($(&$A,)+) -> Behavior<B> + 'static,
			eq: Eq<B>,
		) -> Behavior<B> {
			let runtime = ($($a.runtime().clone(),)+).0;
			let out = Behavior::pending(runtime.clone(), eq);
			$(let $a = $a.clone();)+
			let out2 = out.clone();
			let _ = runtime.spawn_reader(move || {
				$(subscribe_current(&$a);)+
				let result: Outcome<Behavior<B>> = (|| {
					$(let $a = read_result(&$a)?;)+
					Ok(f($(&$a,)+))
				})();
				match result {
					Ok(inner) => {
						subscribe_current(&inner);
						write(&out2, read_result(&inner));
					}
					Err(error) => write(&out2, Err(error)),
				}
			});
			out
		}
	};
}

lift_n!(lift2, A1: a1, A2: a2);
lift_n!(lift3, A1: a1, A2: a2, A3: a3);
lift_n!(lift4, A1: a1, A2: a2, A3: a3, A4: a4);
lift_n!(lift5, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5);
lift_n!(lift6, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5, A6: a6);
lift_n!(lift7, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5, A6: a6, A7: a7);

bind_n!(bind2, A1: a1, A2: a2);
bind_n!(bind3, A1: a1, A2: a2, A3: a3);
bind_n!(bind4, A1: a1, A2: a2, A3: a3, A4: a4);
bind_n!(bind5, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5);
bind_n!(bind6, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5, A6: a6);
bind_n!(bind7, A1: a1, A2: a2, A3: a3, A4: a4, A5: a5, A6: a6, A7: a7);

