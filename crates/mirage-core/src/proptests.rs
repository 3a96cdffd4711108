//! Property-based tests for constant arithmetic and canonical equality.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{Expr, Multiset, Number, Operator};

    // Strategy for generating small integers
    fn small_int() -> impl Strategy<Value = i64> {
        -1000i64..1000i64
    }

    // Strategy for generating non-zero integers
    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
    }

    proptest! {
        #[test]
        fn floor_division_reconstructs_dividend(a in small_int(), b in non_zero_int()) {
            let (na, nb) = (Number::from(a), Number::from(b));
            let q = na.floor_div(&nb).unwrap();
            let r = na.modulo(&nb).unwrap();
            prop_assert_eq!(&(&nb * &q) + &r, na);
            let floored = a.div_euclid(b) - i64::from(b < 0 && a.rem_euclid(b) != 0);
            prop_assert_eq!(q, Number::from(floored));
        }

        #[test]
        fn modulo_takes_sign_of_divisor(a in small_int(), b in non_zero_int()) {
            let r = Number::from(a).modulo(&Number::from(b)).unwrap();
            prop_assert!(r.is_int(0) || r.is_negative() == (b < 0));
        }

        #[test]
        fn bit_not_is_an_involution(a in small_int()) {
            let n = Number::from(a);
            prop_assert_eq!(n.bit_not().unwrap().bit_not().unwrap(), n);
            prop_assert_eq!(Number::from(a).bit_not().unwrap(), Number::from(!a));
        }

        #[test]
        fn bitwise_ops_match_i64(a in small_int(), b in small_int()) {
            let (na, nb) = (Number::from(a), Number::from(b));
            prop_assert_eq!(na.bit_and(&nb).unwrap(), Number::from(a & b));
            prop_assert_eq!(na.bit_or(&nb).unwrap(), Number::from(a | b));
            prop_assert_eq!(na.bit_xor(&nb).unwrap(), Number::from(a ^ b));
        }

        #[test]
        fn rotations_cancel(value in 0u32..=u32::MAX, amount in 0u32..64) {
            let n = Number::from(value);
            let k = Number::from(amount);
            let there = n.rotate_left(&k, 32).unwrap();
            prop_assert_eq!(there.rotate_right(&k, 32).unwrap(), n);
            prop_assert_eq!(there, Number::from(value.rotate_left(amount)));
        }

        #[test]
        fn multiset_ignores_insertion_order(mut items in prop::collection::vec(0usize..4, 0..12)) {
            let names = ["a", "b", "c", "d"];
            let forward: Multiset = items.iter().map(|&i| Expr::symbol(names[i])).collect();
            items.reverse();
            let backward: Multiset = items.iter().map(|&i| Expr::symbol(names[i])).collect();
            prop_assert_eq!(&forward, &backward);
            prop_assert_eq!(forward.total(), items.len() as u64);
        }

        #[test]
        fn sum_equality_is_commutative(a in small_int(), b in small_int()) {
            let x = Expr::symbol("x");
            let left =
                Expr::operation(Operator::Add, [x.clone(), Expr::int(a), Expr::int(b)]).unwrap();
            let right = Expr::operation(Operator::Add, [Expr::int(b), x, Expr::int(a)]).unwrap();
            prop_assert_eq!(left, right);
        }
    }
}
