//! Reference library
//!
//! Declaration-only sources for the slice of the base class library the
//! analyzer reasons about. They are parsed by the same parser as user code,
//! once per process, and every type is tagged with the library it belongs to.

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::{Declarations, Origin};
use crate::cst::SyntaxTree;

pub const SYSTEM_RUNTIME: &str = "System.Runtime";
pub const SYSTEM_COLLECTIONS: &str = "System.Collections";
pub const SYSTEM_LINQ: &str = "System.Linq";

const SYSTEM: &str = r#"
using System.Collections.Generic;

namespace System
{
    public class Object
    {
        public string ToString();
        public bool Equals(object obj);
        public int GetHashCode();
    }

    public struct Int32
    {
        public static bool TryParse(string s, out int result);
        public static int Parse(string s);
    }

    public struct Int64
    {
        public static bool TryParse(string s, out long result);
    }

    public struct Double
    {
        public static bool TryParse(string s, out double result);
    }

    public struct Boolean
    {
        public static bool TryParse(string value, out bool result);
    }

    public struct Char
    {
        public static bool IsDigit(char c);
    }

    public struct Single { }
    public struct Decimal { }

    public class String : IEnumerable<char>
    {
        public int Length { get; }
        public string[] Split(char separator);
        public bool StartsWith(string value);
        public bool Contains(string value);
        public string Trim();
        public string ToUpper();
        public static string Join(string separator, IEnumerable<string> values);
        public static bool IsNullOrEmpty(string value);
    }

    public static class Console
    {
        public static void WriteLine();
        public static void WriteLine(object value);
        public static void Write(object value);
        public static string ReadLine();
    }

    public abstract class Enum
    {
        public static bool TryParse<TEnum>(string value, out TEnum result);
    }

    public struct DayOfWeek { }

    public class Exception
    {
        public string Message { get; }
    }

    public class Action { }
    public class Action<T> { }
    public class Action<T1, T2> { }
    public class Func<TResult> { }
    public class Func<T, TResult> { }
    public class Func<T1, T2, TResult> { }
}
"#;

const COLLECTIONS: &str = r#"
using System;
using System.Collections;

namespace System.Collections
{
    public interface IEnumerable { }
}

namespace System.Collections.Generic
{
    public interface IEnumerable<T> : IEnumerable { }

    public interface IReadOnlyCollection<T> : IEnumerable<T>
    {
        int Count { get; }
    }

    public interface IReadOnlyList<T> : IReadOnlyCollection<T> { }

    public interface ICollection<T> : IEnumerable<T>
    {
        int Count { get; }
        void Add(T item);
        bool Contains(T item);
        bool Remove(T item);
        void Clear();
    }

    public interface IList<T> : ICollection<T>
    {
        int IndexOf(T item);
        void Insert(int index, T item);
    }

    public interface ISet<T> : ICollection<T> { }

    public interface IEqualityComparer<T>
    {
        bool Equals(T x, T y);
        int GetHashCode(T obj);
    }

    public class List<T> : IList<T>, IReadOnlyList<T>
    {
        public List();
        public int Count { get; }
        public void Add(T item);
        public void AddRange(IEnumerable<T> collection);
        public bool Contains(T item);
        public bool Remove(T item);
        public void Clear();
        public int IndexOf(T item);
        public void Insert(int index, T item);
        public void ForEach(Action<T> action);
        public T[] ToArray();
        public void Sort();
    }

    public class HashSet<T> : ISet<T>, IReadOnlyCollection<T>
    {
        public HashSet();
        public int Count { get; }
        public bool Add(T item);
        public bool Contains(T item);
        public bool Remove(T item);
        public void Clear();
        public void UnionWith(IEnumerable<T> other);
    }

    public struct KeyValuePair<TKey, TValue>
    {
        public TKey Key { get; }
        public TValue Value { get; }
    }

    public class Dictionary<TKey, TValue> : ICollection<KeyValuePair<TKey, TValue>>, IReadOnlyCollection<KeyValuePair<TKey, TValue>>
    {
        public Dictionary();
        public int Count { get; }
        public void Add(TKey key, TValue value);
        public bool ContainsKey(TKey key);
        public bool TryGetValue(TKey key, out TValue value);
        public bool Remove(TKey key);
    }
}
"#;

const LINQ: &str = r#"
using System;
using System.Collections;
using System.Collections.Generic;

namespace System.Linq
{
    public interface IQueryable<T> : IEnumerable<T> { }

    public interface IOrderedEnumerable<T> : IEnumerable<T> { }

    public static class Enumerable
    {
        public static IEnumerable<TSource> Append<TSource>(this IEnumerable<TSource> source, TSource element);
        public static IEnumerable<TSource> Prepend<TSource>(this IEnumerable<TSource> source, TSource element);
        public static IEnumerable<TSource> Concat<TSource>(this IEnumerable<TSource> first, IEnumerable<TSource> second);
        public static TSource[] ToArray<TSource>(this IEnumerable<TSource> source);
        public static List<TSource> ToList<TSource>(this IEnumerable<TSource> source);
        public static HashSet<TSource> ToHashSet<TSource>(this IEnumerable<TSource> source);
        public static HashSet<TSource> ToHashSet<TSource>(this IEnumerable<TSource> source, IEqualityComparer<TSource> comparer);
        public static IEnumerable<TSource> Distinct<TSource>(this IEnumerable<TSource> source);
        public static IEnumerable<TSource> Distinct<TSource>(this IEnumerable<TSource> source, IEqualityComparer<TSource> comparer);
        public static IEnumerable<TSource> Where<TSource>(this IEnumerable<TSource> source, Func<TSource, bool> predicate);
        public static IEnumerable<TResult> Select<TSource, TResult>(this IEnumerable<TSource> source, Func<TSource, TResult> selector);
        public static IOrderedEnumerable<TSource> OrderBy<TSource, TKey>(this IEnumerable<TSource> source, Func<TSource, TKey> keySelector);
        public static IEnumerable<TSource> Reverse<TSource>(this IEnumerable<TSource> source);
        public static IEnumerable<TSource> Skip<TSource>(this IEnumerable<TSource> source, int count);
        public static IEnumerable<TSource> Take<TSource>(this IEnumerable<TSource> source, int count);
        public static int Count<TSource>(this IEnumerable<TSource> source);
        public static int Count<TSource>(this IEnumerable<TSource> source, Func<TSource, bool> predicate);
        public static bool Any<TSource>(this IEnumerable<TSource> source);
        public static bool Any<TSource>(this IEnumerable<TSource> source, Func<TSource, bool> predicate);
        public static bool All<TSource>(this IEnumerable<TSource> source, Func<TSource, bool> predicate);
        public static TSource First<TSource>(this IEnumerable<TSource> source);
        public static TSource First<TSource>(this IEnumerable<TSource> source, Func<TSource, bool> predicate);
        public static TSource FirstOrDefault<TSource>(this IEnumerable<TSource> source);
        public static TSource Last<TSource>(this IEnumerable<TSource> source);
        public static bool Contains<TSource>(this IEnumerable<TSource> source, TSource value);
        public static int Sum(this IEnumerable<int> source);
        public static IEnumerable<TResult> Empty<TResult>();
        public static IEnumerable<TSource> Intersect<TSource>(this IEnumerable<TSource> first, IEnumerable<TSource> second);
        public static IEnumerable<TSource> Except<TSource>(this IEnumerable<TSource> first, IEnumerable<TSource> second);
        public static IEnumerable<TSource> Union<TSource>(this IEnumerable<TSource> first, IEnumerable<TSource> second);
        public static IEnumerable<TResult> OfType<TResult>(this IEnumerable source);
        public static IEnumerable<TSource> AsEnumerable<TSource>(this IEnumerable<TSource> source);
        public static bool SequenceEqual<TSource>(this IEnumerable<TSource> first, IEnumerable<TSource> second);
    }

    public static class Queryable
    {
        public static IQueryable<TElement> AsQueryable<TElement>(this IEnumerable<TElement> source);
        public static IQueryable<TSource> Where<TSource>(this IQueryable<TSource> source, Func<TSource, bool> predicate);
        public static IQueryable<TResult> Select<TSource, TResult>(this IQueryable<TSource> source, Func<TSource, TResult> selector);
        public static IQueryable<TSource> Distinct<TSource>(this IQueryable<TSource> source);
        public static IQueryable<TSource> Skip<TSource>(this IQueryable<TSource> source, int count);
        public static IQueryable<TSource> Take<TSource>(this IQueryable<TSource> source, int count);
        public static int Count<TSource>(this IQueryable<TSource> source);
    }
}
"#;

/// Library name and declaration source
const SOURCES: &[(&str, &str)] = &[
    (SYSTEM_RUNTIME, SYSTEM),
    (SYSTEM_COLLECTIONS, COLLECTIONS),
    (SYSTEM_LINQ, LINQ),
];

static LIBRARY: Lazy<Declarations> = Lazy::new(|| {
    let roots: Vec<_> = SOURCES
        .iter()
        .map(|(library, source)| {
            let tree = SyntaxTree::parse(source);
            if tree.has_errors() {
                warn!(library, errors = ?tree.errors(), "Reference library has syntax errors");
            }
            (tree.root(), Origin::Library((*library).to_string()))
        })
        .collect();
    let declarations = Declarations::build(&roots, &Declarations::default());
    debug!(types = declarations.len(), "Loaded reference library");
    declarations
});

/// Declarations of the reference library
pub fn library() -> &'static Declarations {
    &LIBRARY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::TypeRef;

    #[test]
    fn test_sources_parse_cleanly() {
        for (library, source) in SOURCES {
            let tree = SyntaxTree::parse(source);
            assert!(!tree.has_errors(), "{library}: {:?}", tree.errors());
        }
    }

    #[test]
    fn test_library_origins() {
        let enumerable = library().get("System.Linq", "Enumerable", 0).unwrap();
        assert_eq!(enumerable.origin, Origin::Library(SYSTEM_LINQ.to_string()));
        assert!(enumerable.is_static);
        let list = library()
            .get("System.Collections.Generic", "List", 1)
            .unwrap();
        assert_eq!(list.origin.library(), Some(SYSTEM_COLLECTIONS));
    }

    #[test]
    fn test_extension_signatures_resolve() {
        let enumerable = library().get("System.Linq", "Enumerable", 0).unwrap();
        let to_array = enumerable
            .methods
            .iter()
            .find(|m| m.name == "ToArray")
            .unwrap();
        assert!(to_array.is_extension);
        assert_eq!(
            to_array.return_type,
            TypeRef::array(TypeRef::Param("TSource".into()))
        );
        let distinct_overloads = enumerable
            .methods
            .iter()
            .filter(|m| m.name == "Distinct")
            .count();
        assert_eq!(distinct_overloads, 2);
        assert_eq!(
            enumerable.methods.iter().filter(|m| m.name == "OfType").count(),
            1
        );
    }

    #[test]
    fn test_string_is_enumerable_of_char() {
        let string = library().get("System", "String", 0).unwrap();
        assert_eq!(
            string.bases,
            vec![TypeRef::named(
                "System.Collections.Generic",
                "IEnumerable",
                vec![TypeRef::system("Char")]
            )]
        );
    }
}
