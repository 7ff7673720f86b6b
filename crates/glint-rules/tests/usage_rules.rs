//! Usage rules verified through annotated samples

use glint_rules::builtin::usage::{
    discard_unused_out_variable, materialize_before_linq, redundant_spread_element,
    redundant_to_array, single_element_concat, to_list_for_each, unique_non_set_collection,
};
use glint_test::{assert_diagnostics, assert_fix, assert_no_diagnostics};

#[test]
fn redundant_to_array_on_each_array_source() {
    assert_fix(
        redundant_to_array::RULE,
        r#"using System.Linq;

class C
{
    void M(string csv)
    {
        var a = [|new[] { 1 }.ToArray()|];
        var b = [|new int[] { 2 }.ToArray()|];
        var c = [|csv.Split(',').ToArray()|];
    }
}
"#,
        r#"using System.Linq;

class C
{
    void M(string csv)
    {
        var a = new[] { 1 };
        var b = new int[] { 2 };
        var c = csv.Split(',');
    }
}
"#,
    );
}

#[test]
fn redundant_to_array_needs_the_library_method() {
    // Without the import `ToArray` does not bind to the extension method
    assert_no_diagnostics(
        redundant_to_array::RULE,
        r#"class C
{
    void M()
    {
        var a = new[] { 1 }.ToArray();
    }
}
"#,
    );
    assert_no_diagnostics(
        redundant_to_array::RULE,
        r#"using System.Collections.Generic;
using System.Linq;

class C
{
    void M(List<int> list, int[] numbers)
    {
        var a = list.ToArray();
        var b = numbers.Where(x => x > 0).ToArray();
    }
}
"#,
    );
}

#[test]
fn materialize_before_linq_flags_the_method_name() {
    assert_fix(
        materialize_before_linq::RULE,
        r#"using System.Linq;

class C
{
    int M(int[] numbers)
    {
        var any = numbers.[|ToList|]().Any(x => x > 1);
        return numbers.[|ToArray|]().Count();
    }
}
"#,
        r#"using System.Linq;

class C
{
    int M(int[] numbers)
    {
        var any = numbers.Any(x => x > 1);
        return numbers.Count();
    }
}
"#,
    );
}

#[test]
fn materialize_before_linq_leaves_queries_alone() {
    assert_no_diagnostics(
        materialize_before_linq::RULE,
        r#"using System;
using System.Collections.Generic;
using System.Linq;

class C
{
    void M(int[] numbers, List<int> list)
    {
        var a = numbers.AsQueryable().ToList().Where(x => x > 1);
        var b = numbers.ToList();
        var c = list.ToArray().First();
        numbers.ToList().ForEach(x => Console.WriteLine(x));
    }
}
"#,
    );
}

#[test]
fn to_list_for_each_becomes_a_loop() {
    assert_fix(
        to_list_for_each::RULE,
        r#"using System;
using System.Linq;

class C
{
    void M(int[] numbers, string[] names)
    {
        [|numbers.ToList().ForEach(n => Console.WriteLine(n))|];
        [|names.ToList().ForEach(Console.WriteLine)|];
    }
}
"#,
        r#"using System;
using System.Linq;

class C
{
    void M(int[] numbers, string[] names)
    {
        foreach (var n in numbers)
        {
            Console.WriteLine(n);
        }
        foreach (var item in names)
        {
            Console.WriteLine(item);
        }
    }
}
"#,
    );
}

#[test]
fn to_list_for_each_requires_a_statement() {
    assert_no_diagnostics(
        to_list_for_each::RULE,
        r#"using System;
using System.Collections.Generic;
using System.Linq;

class C
{
    void M(List<int> list)
    {
        list.ForEach(n => Console.WriteLine(n));
    }
}
"#,
    );
}

#[test]
fn single_element_concat_becomes_append() {
    assert_fix(
        single_element_concat::RULE,
        r#"using System.Collections.Generic;
using System.Linq;

class C
{
    void M(int[] numbers)
    {
        var a = [|numbers.Concat(new[] { 1 })|];
        var b = [|numbers.Concat(new List<int>() { 2 })|];
        var c = [|numbers.Concat([3])|];
        var d = numbers.Concat([4, 5]);
    }
}
"#,
        r#"using System.Collections.Generic;
using System.Linq;

class C
{
    void M(int[] numbers)
    {
        var a = numbers.Append(1);
        var b = numbers.Append(2);
        var c = numbers.Append(3);
        var d = numbers.Concat([4, 5]);
    }
}
"#,
    );
}

#[test]
fn unique_non_set_collection_skips_comparer_overload() {
    assert_diagnostics(
        unique_non_set_collection::RULE,
        r#"using System.Collections.Generic;
using System.Linq;

class C
{
    void M(int[] numbers, IEqualityComparer<int> comparer)
    {
        var a = [|numbers.Distinct().ToList()|];
        var b = numbers.Distinct(comparer).ToList();
        var c = numbers.Distinct().ToList().Count();
    }
}
"#,
    );
}

#[test]
fn discard_unused_out_variable_per_variable() {
    assert_fix(
        discard_unused_out_variable::RULE,
        r#"using System;
using System.Collections.Generic;

class C
{
    void M(Dictionary<string, int> scores, string text)
    {
        scores.TryGetValue("a", out var [|first|]);
        scores.TryGetValue("b", out int [|second|]);
        if (int.TryParse(text, out var parsed))
        {
            Console.WriteLine(parsed);
        }
    }
}
"#,
        r#"using System;
using System.Collections.Generic;

class C
{
    void M(Dictionary<string, int> scores, string text)
    {
        scores.TryGetValue("a", out _);
        scores.TryGetValue("b", out _);
        if (int.TryParse(text, out var parsed))
        {
            Console.WriteLine(parsed);
        }
    }
}
"#,
    );
}

#[test]
fn discard_unused_out_variable_counts_interpolation() {
    assert_no_diagnostics(
        discard_unused_out_variable::RULE,
        r#"using System;

class C
{
    void M(string text)
    {
        int.TryParse(text, out var number);
        Console.WriteLine($"{number} parsed");
    }
}
"#,
    );
}

#[test]
fn redundant_spread_element_in_multiline_literal() {
    assert_fix(
        redundant_spread_element::RULE,
        r#"using System.Collections.Generic;

class C
{
    List<int> M(int[] rest)
    {
        return
        [
            0,
            [|..new[] { 1, 2 }|],
            [|..new List<int> { 3 }|],
            ..rest,
        ];
    }
}
"#,
        r#"using System.Collections.Generic;

class C
{
    List<int> M(int[] rest)
    {
        return
        [
            0,
            1, 2,
            3,
            ..rest,
        ];
    }
}
"#,
    );
}
